//! Spec discovery and naming.
//!
//! A "spec" is either the root `PROMPT.md` or a `*.spec.md` file found under
//! `.ralph/specs/` or `specs/`. Discovery order is deterministic: it is the
//! only thing downstream code may rely on before state-driven priority
//! ordering (see `ralph-scheduler`) takes over.

use ralph_utils::error::SpecError;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

/// A discovered spec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    pub path: PathBuf,
    pub rel_posix: String,
    pub is_prompt: bool,
}

fn rel_posix(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Discover specs under `root`: the root `PROMPT.md` (if present), then every
/// `*.spec.md` under `.ralph/specs/` and `specs/`, sorted prompt-first then
/// alphabetically by `rel_posix`.
pub fn discover_specs(root: &Path) -> Result<Vec<Spec>, SpecError> {
    let mut specs = Vec::new();

    let prompt_path = root.join("PROMPT.md");
    if prompt_path.is_file() {
        specs.push(Spec {
            rel_posix: rel_posix(&prompt_path, root),
            path: prompt_path,
            is_prompt: true,
        });
    }

    for spec_root in [root.join(".ralph").join("specs"), root.join("specs")] {
        if !spec_root.is_dir() {
            continue;
        }
        collect_spec_files(&spec_root, root, &mut specs)?;
    }

    specs.sort_by(|a, b| spec_sort_key(a).cmp(&spec_sort_key(b)));
    Ok(specs)
}

fn collect_spec_files(dir: &Path, root: &Path, out: &mut Vec<Spec>) -> Result<(), SpecError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SpecError::ReadFailed {
        path: dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| SpecError::ReadFailed {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_spec_files(&path, root, out)?;
        } else if path.is_file() && path.to_string_lossy().ends_with(".spec.md") {
            out.push(Spec {
                rel_posix: rel_posix(&path, root),
                path,
                is_prompt: false,
            });
        }
    }
    Ok(())
}

/// Sort key used by [`discover_specs`]: prompt first, then alphabetical.
fn spec_sort_key(spec: &Spec) -> (u8, String) {
    if spec.is_prompt {
        (0, "000-prompt.spec.md".to_string())
    } else {
        (1, spec.rel_posix.clone())
    }
}

/// Short (6 hex char) sha1 fingerprint of a normalised relative path.
///
/// Distinguishes specs that share a basename but live at different paths
/// when deriving storage keys.
pub fn spec_hash(rel_posix: &str) -> String {
    let normalized = rel_posix.replace('\\', "/");
    let digest = Sha1::digest(normalized.as_bytes());
    let hex = format!("{digest:x}");
    hex[..6].to_string()
}

/// Full sha1 hex digest of a spec's content, or `None` if the file is missing.
pub fn spec_content_hash(path: &Path) -> Option<String> {
    let content = std::fs::read(path).ok()?;
    Some(format!("{:x}", Sha1::digest(content)))
}

/// True if `rel_posix` is (case-insensitively) the root prompt path.
pub fn is_prompt_path(rel_posix: &str) -> bool {
    rel_posix.replace('\\', "/").to_lowercase() == "prompt.md"
}

/// Base name used for per-spec storage, stripping only a single trailing
/// `.md` (so `foo.spec.md` becomes `foo.spec`, not `foo`).
pub fn spec_base_name(rel_posix: &str) -> String {
    if is_prompt_path(rel_posix) {
        return "000-prompt".to_string();
    }
    let normalized = rel_posix.replace('\\', "/");
    let name = normalized.rsplit('/').next().unwrap_or(&normalized);
    match name.strip_suffix(".md") {
        Some(stripped) => stripped.to_string(),
        None => name.to_string(),
    }
}

/// `{basename}-{hash}` key used to namespace per-spec handoffs and history.
pub fn spec_resource_key(rel_posix: &str) -> String {
    format!("{}-{}", spec_base_name(rel_posix), spec_hash(rel_posix))
}

/// Read a spec's trimmed text content, or `None` if empty/missing.
pub fn read_spec_content(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hash_is_six_hex_chars_and_slash_invariant() {
        let a = spec_hash("specs/foo.spec.md");
        let b = spec_hash("specs\\foo.spec.md");
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn base_name_strips_only_trailing_md() {
        assert_eq!(spec_base_name("specs/foo.spec.md"), "foo.spec");
        assert_eq!(spec_base_name("PROMPT.md"), "000-prompt");
        assert_eq!(spec_base_name("specs/nested/bar.spec.md"), "bar.spec");
    }

    #[test]
    fn resource_key_combines_base_and_hash() {
        let key = spec_resource_key("specs/foo.spec.md");
        assert!(key.starts_with("foo.spec-"));
        assert_eq!(key.len(), "foo.spec-".len() + 6);
    }

    #[test]
    fn discovery_sorts_prompt_first_then_alphabetical() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("PROMPT.md"), "goal").unwrap();
        let specs_dir = dir.path().join("specs");
        fs::create_dir_all(&specs_dir).unwrap();
        fs::write(specs_dir.join("b.spec.md"), "b").unwrap();
        fs::write(specs_dir.join("a.spec.md"), "a").unwrap();

        let specs = discover_specs(dir.path()).unwrap();
        assert_eq!(specs.len(), 3);
        assert!(specs[0].is_prompt);
        assert_eq!(specs[1].rel_posix, "specs/a.spec.md");
        assert_eq!(specs[2].rel_posix, "specs/b.spec.md");
    }

    #[test]
    fn content_hash_none_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.spec.md");
        assert!(spec_content_hash(&missing).is_none());
    }

    #[test]
    fn read_spec_content_empty_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.spec.md");
        fs::write(&path, "   \n  ").unwrap();
        assert_eq!(read_spec_content(&path), None);
    }
}
