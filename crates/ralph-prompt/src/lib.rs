//! Prompt assembly: a pure, I/O-free rendering of one iteration's context
//! into the text sent to an assistant CLI. Swappable by callers that want
//! different wording; the core only depends on the fields in
//! [`PromptContext`].

const PROMPT_TEMPLATE: &str = "# RALPH LOOP - ROTATION {iteration}/{max_iterations} [{mode}]

You are operating in a **Ralph Loop** - an autonomous development technique using context
rotation. Your progress persists in files. Each rotation starts fresh but continues from
where the last left off.

## YOUR GOAL

{goal}

## GUARDRAILS (lessons from previous rotations - MUST follow these)

{guardrails}

## CURRENT STATE (from previous rotation)

{handoff}

## WORKING FILES

- Spec: {spec_path}
- Handoff: {handoff_path}

## YOUR INSTRUCTIONS

1. **Orient**: Read the handoff state. Understand where we are.
2. **Execute**: Work toward the goal. Make real progress.
3. **Test**: Run tests frequently to verify progress.
4. **Update State**: Keep the handoff file current with your progress.
5. **Learn**: If you discover something important, add it to .ralph/guardrails.md

## COMPLETION SIGNALS

Write ONE of these to .ralph/status:
- **CONTINUE** - Still working, making progress (default)
- **ROTATE** - Ready for fresh context (before yours gets too long/polluted)
- **DONE** - Goal fully achieved, all success criteria met
- **STUCK** - Blocked, need human help

## COMPLETION PROTOCOL

Signaling DONE triggers a verification cycle:
- You must confirm completion 3 times total
- Each review rotation checks your work thoroughly
- If you make changes during review, verification resets
- Only after 3 consecutive DONE signals (with no changes) is the task truly complete

## RULES

- NEVER ignore guardrails - they exist because previous rotations learned hard lessons
- ALWAYS update the handoff file before signaling ROTATE or DONE
- Keep the handoff file detailed but concise - it's your memory across rotations
- Signal ROTATE proactively when you feel context getting cluttered
- Only signal DONE when ALL success criteria in the spec are met
";

/// Everything the default template needs to render one iteration's prompt.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub iteration: u32,
    pub max_iterations: u32,
    pub done_count: i64,
    pub goal: &'a str,
    pub handoff: &'a str,
    pub guardrails: &'a str,
    pub spec_path: &'a str,
    pub handoff_path: &'a str,
}

/// REVIEW once a spec has claimed DONE at least once; IMPLEMENT otherwise.
pub fn mode_for(done_count: i64) -> &'static str {
    if done_count > 0 {
        "REVIEW"
    } else {
        "IMPLEMENT"
    }
}

/// Render the canonical Ralph-loop prompt for one iteration.
pub fn assemble_prompt(ctx: &PromptContext<'_>) -> String {
    PROMPT_TEMPLATE
        .replace("{iteration}", &ctx.iteration.to_string())
        .replace("{max_iterations}", &ctx.max_iterations.to_string())
        .replace("{mode}", mode_for(ctx.done_count))
        .replace("{goal}", ctx.goal)
        .replace("{guardrails}", ctx.guardrails)
        .replace("{handoff}", ctx.handoff)
        .replace("{spec_path}", ctx.spec_path)
        .replace("{handoff_path}", ctx.handoff_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(done_count: i64) -> PromptContext<'static> {
        PromptContext {
            iteration: 2,
            max_iterations: 50,
            done_count,
            goal: "ship the thing",
            handoff: "made progress on X",
            guardrails: "don't touch Y",
            spec_path: ".ralph/specs/a.spec.md",
            handoff_path: ".ralph/handoffs/a.spec-abc123.md",
        }
    }

    #[test]
    fn mode_is_implement_before_any_done_signal() {
        assert_eq!(mode_for(0), "IMPLEMENT");
    }

    #[test]
    fn mode_is_review_after_a_done_signal() {
        assert_eq!(mode_for(1), "REVIEW");
    }

    #[test]
    fn renders_all_fields_with_no_placeholders_left() {
        let rendered = assemble_prompt(&ctx(1));
        assert!(rendered.contains("ROTATION 2/50 [REVIEW]"));
        assert!(rendered.contains("ship the thing"));
        assert!(rendered.contains("don't touch Y"));
        assert!(rendered.contains("made progress on X"));
        assert!(rendered.contains(".ralph/specs/a.spec.md"));
        assert!(rendered.contains(".ralph/handoffs/a.spec-abc123.md"));
        assert!(!rendered.contains('{'));
    }
}
