//! Interface to the remote workspace file tree.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::Path;

use crate::error::WorkspaceResult;

/// File store rooted at the platform workspace tree.
///
/// Implementations upload template files under paths such as
/// `/Workspace/Users/{user}/{server_name}`; test doubles stand in for the
/// live API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Creates a workspace directory and any missing parents. Succeeds
    /// when the directory already exists.
    async fn mkdirs(&self, path: &str) -> WorkspaceResult<()>;

    /// Uploads one local file to a workspace path.
    async fn import_file(&self, local: &Path, remote: &str, overwrite: bool)
    -> WorkspaceResult<()>;

    /// Returns the user name of the authenticated principal.
    async fn current_user(&self) -> WorkspaceResult<String>;
}
