//! Direct application of sync plans.
//!
//! The executor is the in-process alternative to the rendered script: it
//! drives the same directory-then-upload sequence through a
//! [`WorkspaceStore`] and stops at the first failure.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::sync::plan::SyncPlan;
use crate::workspace::WorkspaceStore;

/// Report of a completed upload run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Destination root in the workspace.
    pub dest: String,
    /// Number of files uploaded.
    pub uploaded: usize,
    /// Fingerprint of the plan that was applied.
    pub fingerprint: String,
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short: String = self.fingerprint.chars().take(8).collect();
        write!(
            f,
            "Uploaded {} files to {} (plan {short})",
            self.uploaded, self.dest
        )
    }
}

/// Applies sync plans through a workspace store.
pub struct SyncExecutor<'a> {
    /// Store receiving directories and files.
    store: &'a dyn WorkspaceStore,
}

impl<'a> SyncExecutor<'a> {
    /// Creates an executor over a store.
    #[must_use]
    pub const fn new(store: &'a dyn WorkspaceStore) -> Self {
        Self { store }
    }

    /// Creates every destination directory, then uploads each entry with
    /// overwrite.
    ///
    /// # Errors
    ///
    /// Returns the first store failure. Files already uploaded remain in
    /// place; rerunning the plan overwrites them, so a failed run is safe
    /// to repeat.
    pub async fn apply(&self, plan: &SyncPlan) -> Result<SyncReport> {
        info!(
            "Applying sync plan {} ({} files) to {}",
            plan.short_fingerprint(),
            plan.file_count(),
            plan.dest
        );

        for dir in plan.destination_dirs() {
            debug!("Ensuring directory {dir}");
            self.store.mkdirs(&dir).await?;
        }

        let mut uploaded = 0;
        for entry in &plan.entries {
            debug!("Uploading {} -> {}", entry.local.display(), entry.remote);
            self.store.import_file(&entry.local, &entry.remote, true).await?;
            uploaded += 1;
        }

        let report = SyncReport {
            dest: plan.dest.clone(),
            uploaded,
            fingerprint: plan.fingerprint(),
        };
        info!("{report}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{WorkshopError, WorkspaceError};
    use crate::sync::plan::SyncEntry;
    use crate::workspace::MockWorkspaceStore;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn sample_plan() -> SyncPlan {
        SyncPlan {
            source: PathBuf::from("./custom-mcp-template"),
            dest: String::from("/Workspace/Users/u/srv"),
            entries: vec![
                SyncEntry {
                    relative: String::from("a.py"),
                    local: PathBuf::from("./custom-mcp-template/a.py"),
                    remote: String::from("/Workspace/Users/u/srv/a.py"),
                    digest: String::from("aa"),
                },
                SyncEntry {
                    relative: String::from("sub/c.yaml"),
                    local: PathBuf::from("./custom-mcp-template/sub/c.yaml"),
                    remote: String::from("/Workspace/Users/u/srv/sub/c.yaml"),
                    digest: String::from("cc"),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_apply_creates_directories_then_uploads_in_order() {
        let mut store = MockWorkspaceStore::new();
        let mut seq = Sequence::new();

        store
            .expect_mkdirs()
            .with(eq("/Workspace/Users/u/srv"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_mkdirs()
            .with(eq("/Workspace/Users/u/srv/sub"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_import_file()
            .withf(|local, remote, overwrite| {
                local.ends_with("a.py") && remote == "/Workspace/Users/u/srv/a.py" && *overwrite
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        store
            .expect_import_file()
            .withf(|local, remote, overwrite| {
                local.ends_with("c.yaml")
                    && remote == "/Workspace/Users/u/srv/sub/c.yaml"
                    && *overwrite
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let report = SyncExecutor::new(&store)
            .apply(&sample_plan())
            .await
            .expect("apply succeeds");

        assert_eq!(report.uploaded, 2);
        assert_eq!(report.dest, "/Workspace/Users/u/srv");
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_upload_failure() {
        let mut store = MockWorkspaceStore::new();

        store.expect_mkdirs().times(2).returning(|_| Ok(()));
        store
            .expect_import_file()
            .withf(|local, _, _| local.ends_with("a.py"))
            .times(1)
            .returning(|_, remote, _| {
                Err(WorkspaceError::ImportFailed {
                    path: remote.to_string(),
                    message: String::from("HTTP 500: storage unavailable"),
                })
            });
        store
            .expect_import_file()
            .withf(|local, _, _| local.ends_with("c.yaml"))
            .never();

        let err = SyncExecutor::new(&store)
            .apply(&sample_plan())
            .await
            .expect_err("apply aborts");

        assert!(matches!(
            err,
            WorkshopError::Workspace(WorkspaceError::ImportFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_plan_creates_only_the_root() {
        let mut store = MockWorkspaceStore::new();

        store
            .expect_mkdirs()
            .with(eq("/Workspace/Users/u/srv"))
            .times(1)
            .returning(|_| Ok(()));
        store.expect_import_file().never();

        let plan = SyncPlan {
            source: PathBuf::from("./custom-mcp-template"),
            dest: String::from("/Workspace/Users/u/srv"),
            entries: vec![],
        };
        let report = SyncExecutor::new(&store)
            .apply(&plan)
            .await
            .expect("empty apply succeeds");

        assert_eq!(report.uploaded, 0);
    }
}
