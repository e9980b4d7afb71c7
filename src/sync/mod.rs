//! Template sync workflows.
//!
//! Planning, script rendering, and execution are kept separate: a plan is
//! pure data built from the local tree, the renderer turns it into a
//! reviewable bash script, and the executor applies it directly through
//! the workspace store.

mod executor;
mod plan;
mod script;

pub use executor::{SyncExecutor, SyncReport};
pub use plan::{SyncEntry, SyncPlan};
pub use script::render_script;
