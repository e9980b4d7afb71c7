//! Catalog access for the workshop toolkit.
//!
//! This module holds the two layers between the workflows and the platform:
//! - The statement client speaking the SQL statement execution REST API
//! - The provider trait exposing idempotent catalog operations, with its
//!   SQL-rendering implementation

mod client;
mod provider;

pub use client::StatementClient;
pub use provider::{CatalogProvider, SqlCatalogProvider, TableRef};

#[cfg(test)]
pub use provider::MockCatalogProvider;
