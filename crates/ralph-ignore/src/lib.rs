//! Gitignore-style path filtering for the workspace snapshotter.
//!
//! Compiles an [`IgnoreSpec`] from a `.ralphignore` file (if present) unioned
//! with a fixed built-in exclusion set. The built-ins are always applied
//! regardless of `.ralphignore` content: if the snapshotter ever picked up
//! `.ralph/run/` or `.git/`, the driver would detect its own bookkeeping as a
//! file change on every iteration.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

const BUILTIN_EXCLUDES: &[&str] = &[
    ".ralph/run/**",
    ".git/**",
    "**/target/**",
    "**/node_modules/**",
    "**/.venv/**",
];

/// A compiled include/exclude path matcher.
pub struct IgnoreSpec {
    excludes: GlobSet,
    negations: GlobSet,
}

impl IgnoreSpec {
    /// Compile an ignore spec from `.ralphignore` contents (if any), unioned
    /// with the built-in exclusion set.
    pub fn new(ralphignore_contents: Option<&str>) -> Result<Self, globset::Error> {
        let mut exclude_builder = GlobSetBuilder::new();
        let mut negation_builder = GlobSetBuilder::new();

        for pattern in BUILTIN_EXCLUDES {
            exclude_builder.add(Glob::new(pattern)?);
        }

        if let Some(contents) = ralphignore_contents {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some(negated) = line.strip_prefix('!') {
                    negation_builder.add(Glob::new(&normalize(negated))?);
                } else {
                    exclude_builder.add(Glob::new(&normalize(line))?);
                }
            }
        }

        Ok(Self {
            excludes: exclude_builder.build()?,
            negations: negation_builder.build()?,
        })
    }

    /// An `IgnoreSpec` with only the built-in exclusions.
    pub fn builtin_only() -> Self {
        Self::new(None).expect("builtin patterns are always valid globs")
    }

    /// True if `rel_path` (forward-slash, workspace-relative) should be
    /// excluded from snapshots.
    pub fn is_ignored(&self, rel_path: &Path) -> bool {
        let rel = rel_path.to_string_lossy().replace('\\', "/");
        self.excludes.is_match(&rel) && !self.negations.is_match(&rel)
    }
}

/// A directory-only pattern (`foo/`) is translated to match its contents.
fn normalize(pattern: &str) -> String {
    match pattern.strip_suffix('/') {
        Some(dir) => format!("{dir}/**"),
        None => pattern.to_string(),
    }
}
