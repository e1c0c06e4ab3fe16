//! Filtered filesystem snapshots: the sole source of truth for "did the
//! assistant change anything" between the start and end of an iteration.

use ralph_ignore::IgnoreSpec;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::Path;

/// A snapshot maps each non-ignored, workspace-relative path (forward-slash
/// normalised) to the sha1 hex digest of its content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(BTreeMap<String, String>);

impl Snapshot {
    /// Walk `root`, hashing every file not excluded by `ignore`.
    pub fn capture(root: &Path, ignore: &IgnoreSpec) -> std::io::Result<Self> {
        let mut map = BTreeMap::new();
        walk(root, root, ignore, &mut map)?;
        Ok(Self(map))
    }

    /// Sorted list of paths that differ between `before` and `after`
    /// (added, removed, or content-changed).
    pub fn compare(before: &Snapshot, after: &Snapshot) -> Vec<String> {
        let mut changed: Vec<String> = Vec::new();

        for (path, hash) in &after.0 {
            match before.0.get(path) {
                Some(prev_hash) if prev_hash == hash => {}
                _ => changed.push(path.clone()),
            }
        }
        for path in before.0.keys() {
            if !after.0.contains_key(path) {
                changed.push(path.clone());
            }
        }

        changed.sort();
        changed.dedup();
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn walk(
    dir: &Path,
    root: &Path,
    ignore: &IgnoreSpec,
    out: &mut BTreeMap<String, String>,
) -> std::io::Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(&path);

        if ignore.is_ignored(rel) {
            continue;
        }

        if path.is_dir() {
            walk(&path, root, ignore, out)?;
        } else if path.is_file() {
            let content = std::fs::read(&path)?;
            let hash = format!("{:x}", Sha1::digest(&content));
            out.insert(rel_posix(rel), hash);
        }
    }
    Ok(())
}

fn rel_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn compare_detects_additions_removals_and_modifications() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let ignore = IgnoreSpec::builtin_only();
        let before = Snapshot::capture(dir.path(), &ignore).unwrap();

        fs::write(dir.path().join("a.txt"), "a-changed").unwrap();
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();

        let after = Snapshot::capture(dir.path(), &ignore).unwrap();
        let changed = Snapshot::compare(&before, &after);

        assert_eq!(changed, vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()]);
    }

    #[test]
    fn identical_snapshots_compare_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let ignore = IgnoreSpec::builtin_only();

        let before = Snapshot::capture(dir.path(), &ignore).unwrap();
        let after = Snapshot::capture(dir.path(), &ignore).unwrap();

        assert!(Snapshot::compare(&before, &after).is_empty());
        assert_eq!(before, after);
    }

    #[test]
    fn ignored_paths_are_excluded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".ralph/run")).unwrap();
        fs::write(dir.path().join(".ralph/run/state.json"), "{}").unwrap();
        fs::write(dir.path().join("real.txt"), "x").unwrap();

        let ignore = IgnoreSpec::builtin_only();
        let snap = Snapshot::capture(dir.path(), &ignore).unwrap();

        assert_eq!(snap.len(), 1);
    }
}
