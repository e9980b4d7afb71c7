//! Provisioning workflows for workshop catalogs.
//!
//! This module turns workshop parameters into ordered step plans and
//! executes them against a catalog provider, producing a status report.

mod plan;
mod runner;

pub use plan::{CATALOG_COMMENT, ProvisionPlan, ProvisionStep, SCHEMA_COMMENT};
pub use runner::{CancelFlag, StatusReport, StepOutcome, StepRunner};
