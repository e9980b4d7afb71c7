// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # workshopctl
//!
//! An idempotent provisioning and teardown toolkit for lakehouse workshop
//! environments.
//!
//! ## Overview
//!
//! workshopctl drives a catalog-structured data platform through its SQL
//! and workspace APIs, allowing you to:
//!
//! - Provision a workshop catalog and schema with idempotent statements
//! - Tear down workshop tables, cascading to schema and catalog only on
//!   explicit request
//! - Plan, render, and push an MCP server template into user workspaces
//! - Serve the workshop frontend directory over HTTP
//!
//! ## Architecture
//!
//! Every workflow is a **plan of idempotent steps**:
//!
//! 1. **Plan**: a pure function builds an ordered step list from parameters
//! 2. **Review**: plans print as text, JSON, or an executable script
//! 3. **Execute**: a runner issues the steps in order and stops at the
//!    first failure; reruns are safe because every step is idempotent
//!
//! ## Modules
//!
//! - [`params`]: Parameter parsing, environment overrides, and validation
//! - [`catalog`]: SQL statement execution client and catalog provider
//! - [`provision`]: Provisioning and teardown plans and their runner
//! - [`sync`]: Template sync planning, script rendering, and execution
//! - [`workspace`]: Workspace file store client
//! - [`serve`]: Static asset server
//! - [`cli`]: Command-line interface
//! - [`error`]: Shared error and result types
//!
//! ## Example
//!
//! ```yaml
//! workshop:
//!   catalog: mcp_workshop
//!   schema: default
//!   tables:
//!     - sales
//!     - customers
//!     - products
//!
//! participant:
//!   prefix: alice
//!   server_name: databricks-mcp-workshop
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod cli;
pub mod error;
pub mod params;
pub mod provision;
pub mod serve;
pub mod sync;
pub mod workspace;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::{CatalogProvider, SqlCatalogProvider, StatementClient, TableRef};
pub use cli::{Cli, Commands, OutputFormatter};
pub use error::{Result, WorkshopError};
pub use params::{ParamsResolver, ParamsValidator, PlatformCredentials, WorkshopParams};
pub use provision::{CancelFlag, ProvisionPlan, StatusReport, StepRunner};
pub use serve::ServeConfig;
pub use sync::{SyncExecutor, SyncPlan, render_script};
pub use workspace::{WorkspaceClient, WorkspaceStore};
