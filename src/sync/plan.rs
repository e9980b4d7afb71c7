//! Template sync planning.
//!
//! Builds a deterministic upload plan from a local template tree. Planning
//! is pure filesystem work; nothing here talks to the workspace, so a plan
//! can be inspected or rendered before any upload happens.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SyncError};

/// One file to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    /// Path relative to the template root, with `/` separators.
    pub relative: String,
    /// Local path of the source file.
    pub local: PathBuf,
    /// Full destination path in the workspace.
    pub remote: String,
    /// SHA-256 digest of the file contents.
    pub digest: String,
}

/// Ordered upload plan for one template tree.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
    /// Template root the plan was built from.
    pub source: PathBuf,
    /// Destination root in the workspace.
    pub dest: String,
    /// Entries sorted by relative path.
    pub entries: Vec<SyncEntry>,
}

impl SyncPlan {
    /// Enumerates files under `source` matching any of `patterns` and maps
    /// each to its destination under `dest`, preserving directory
    /// structure. Patterns are file extensions; a leading dot is accepted
    /// (`.py` and `py` are equivalent). An empty match set is a valid,
    /// empty plan.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` does not exist or a file cannot be
    /// read while computing its digest.
    pub fn discover(source: &Path, dest: &str, patterns: &[String]) -> Result<Self> {
        if !source.is_dir() {
            return Err(SyncError::SourceNotFound {
                path: source.to_path_buf(),
            }
            .into());
        }

        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| p.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let mut relatives = Vec::new();
        collect_files(source, source, &patterns, &mut relatives)?;
        // Sorted by relative path for determinism across filesystems
        relatives.sort();

        let dest = dest.trim_end_matches('/');
        let mut entries = Vec::with_capacity(relatives.len());
        for relative in relatives {
            let local = source.join(relative.replace('/', std::path::MAIN_SEPARATOR_STR));
            let digest = hash_file(&local)?;
            entries.push(SyncEntry {
                remote: format!("{dest}/{relative}"),
                relative,
                local,
                digest,
            });
        }

        debug!(
            "Planned {} files from {} to {dest}",
            entries.len(),
            source.display()
        );

        Ok(Self {
            source: source.to_path_buf(),
            dest: dest.to_string(),
            entries,
        })
    }

    /// Returns true if the plan has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of files in the plan.
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Destination directories required by the plan, sorted parent-first
    /// and including the destination root.
    #[must_use]
    pub fn destination_dirs(&self) -> Vec<String> {
        let mut dirs = BTreeSet::new();
        dirs.insert(self.dest.clone());
        for entry in &self.entries {
            if let Some((parent, _)) = entry.remote.rsplit_once('/') {
                dirs.insert(parent.to_string());
            }
        }
        dirs.into_iter().collect()
    }

    /// Computes a digest over the whole plan for change detection. Two
    /// plans with the same destination, file set, and file contents share
    /// a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.dest.as_bytes());
        for entry in &self.entries {
            hasher.update(entry.relative.as_bytes());
            hasher.update(entry.digest.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// First 8 characters of the fingerprint, for display.
    #[must_use]
    pub fn short_fingerprint(&self) -> String {
        self.fingerprint().chars().take(8).collect()
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Sync plan {}: {} files from '{}' to '{}'",
            self.short_fingerprint(),
            self.entries.len(),
            self.source.display(),
            self.dest
        )?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "  {}. {} -> {}", i + 1, entry.relative, entry.remote)?;
        }
        Ok(())
    }
}

/// Recursively collects matching regular files as `/`-separated relative
/// paths. Symlinks are not followed.
fn collect_files(
    root: &Path,
    dir: &Path,
    patterns: &[String],
    relatives: &mut Vec<String>,
) -> Result<()> {
    let reader = std::fs::read_dir(dir).map_err(|e| SyncError::ReadFailed {
        path: dir.to_path_buf(),
        message: format!("Failed to list directory: {e}"),
    })?;

    for entry in reader {
        let entry = entry.map_err(|e| SyncError::ReadFailed {
            path: dir.to_path_buf(),
            message: format!("Failed to list directory: {e}"),
        })?;
        let path = entry.path();

        // The entry's own file type, without traversing symlinks; a linked
        // directory cycle is skipped rather than recursed into.
        let file_type = entry.file_type().map_err(|e| SyncError::ReadFailed {
            path: path.clone(),
            message: format!("Failed to inspect entry: {e}"),
        })?;

        if file_type.is_dir() {
            collect_files(root, &path, patterns, relatives)?;
        } else if file_type.is_file() && matches_pattern(&path, patterns) {
            relatives.push(relative_unix(root, &path));
        }
    }

    Ok(())
}

/// Returns true if the file's extension matches any pattern.
fn matches_pattern(path: &Path, patterns: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            patterns.iter().any(|p| *p == ext)
        })
}

/// Returns `path` relative to `root` with `/` separators.
fn relative_unix(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Computes the SHA-256 digest of a file.
fn hash_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| SyncError::ReadFailed {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkshopError;
    use tempfile::TempDir;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|p| (*p).to_string()).collect()
    }

    fn template_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.py"), "print('a')\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "not synced\n").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.yaml"), "key: value\n").unwrap();
        dir
    }

    #[test]
    fn test_mixed_tree_yields_only_matching_entries() {
        let dir = template_tree();

        let plan = SyncPlan::discover(
            dir.path(),
            "/Workspace/Users/u/srv",
            &patterns(&[".py", ".yaml", ".toml", ".md"]),
        )
        .unwrap();

        assert_eq!(plan.file_count(), 2);
        assert_eq!(plan.entries[0].relative, "a.py");
        assert_eq!(plan.entries[0].remote, "/Workspace/Users/u/srv/a.py");
        assert_eq!(plan.entries[1].relative, "sub/c.yaml");
        assert_eq!(plan.entries[1].remote, "/Workspace/Users/u/srv/sub/c.yaml");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");

        let err = SyncPlan::discover(&missing, "/Workspace/x", &patterns(&["py"])).unwrap_err();

        assert!(matches!(
            err,
            WorkshopError::Sync(SyncError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_no_matches_is_a_valid_empty_plan() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "x").unwrap();

        let plan = SyncPlan::discover(dir.path(), "/Workspace/x", &patterns(&["py"])).unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.destination_dirs(), vec!["/Workspace/x"]);
    }

    #[test]
    fn test_plans_over_unchanged_tree_are_identical() {
        let dir = template_tree();
        let pats = patterns(&["py", "yaml"]);

        let first = SyncPlan::discover(dir.path(), "/Workspace/x", &pats).unwrap();
        let second = SyncPlan::discover(dir.path(), "/Workspace/x", &pats).unwrap();

        assert_eq!(first.entries, second.entries);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_file_content() {
        let dir = template_tree();
        let pats = patterns(&["py", "yaml"]);

        let before = SyncPlan::discover(dir.path(), "/Workspace/x", &pats)
            .unwrap()
            .fingerprint();
        std::fs::write(dir.path().join("a.py"), "print('changed')\n").unwrap();
        let after = SyncPlan::discover(dir.path(), "/Workspace/x", &pats)
            .unwrap()
            .fingerprint();

        assert_ne!(before, after);
    }

    #[test]
    fn test_dotted_and_bare_patterns_are_equivalent() {
        let dir = template_tree();

        let dotted = SyncPlan::discover(dir.path(), "/Workspace/x", &patterns(&[".py"])).unwrap();
        let bare = SyncPlan::discover(dir.path(), "/Workspace/x", &patterns(&["py"])).unwrap();

        assert_eq!(dotted.entries, bare.entries);
    }

    #[test]
    fn test_destination_dirs_are_parent_first() {
        let dir = template_tree();

        let plan = SyncPlan::discover(
            dir.path(),
            "/Workspace/Users/u/srv/",
            &patterns(&["py", "yaml"]),
        )
        .unwrap();

        assert_eq!(
            plan.destination_dirs(),
            vec!["/Workspace/Users/u/srv", "/Workspace/Users/u/srv/sub"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_cycle_is_not_followed() {
        let dir = template_tree();
        // Link back to the root from below; following it would never end.
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

        let plan =
            SyncPlan::discover(dir.path(), "/Workspace/x", &patterns(&["py", "yaml"])).unwrap();

        assert_eq!(plan.file_count(), 2);
        assert_eq!(plan.entries[0].relative, "a.py");
        assert_eq!(plan.entries[1].relative, "sub/c.yaml");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_not_planned() {
        let dir = template_tree();
        std::os::unix::fs::symlink(dir.path().join("a.py"), dir.path().join("linked.py"))
            .unwrap();

        let plan = SyncPlan::discover(dir.path(), "/Workspace/x", &patterns(&["py"])).unwrap();

        assert_eq!(plan.file_count(), 1);
        assert_eq!(plan.entries[0].relative, "a.py");
    }
}
