//! Canned templates the driver writes on first creation of a driver-owned file.

pub const HANDOFF_TEMPLATE: &str = "# Handoff\n\n## Completed\n\n## In Progress\n\n## Next Steps\n\n## Notes\n";

pub const GUARDRAILS_TEMPLATE: &str = "# Guardrails\n";

pub const PROMPT_TEMPLATE: &str = "# Goal\n\nDescribe what you want to accomplish.\n\n# Context\n\nAny relevant background information.\n\n# Success Criteria\n\n- [ ] Criterion 1\n- [ ] Criterion 2\n\n# Constraints\n\nAny limitations or requirements.\n";
