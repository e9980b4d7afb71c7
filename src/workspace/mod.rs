//! Remote workspace file tree access.
//!
//! This module defines the store interface used by template sync and its
//! REST implementation.

mod client;
mod store;

pub use client::WorkspaceClient;
pub use store::WorkspaceStore;

#[cfg(test)]
pub use store::MockWorkspaceStore;
