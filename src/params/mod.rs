//! Operator parameter module for the workshop toolkit.
//!
//! This module handles everything that shapes a run before any API call:
//! - Parsing and defaulting the optional `workshop.yaml`
//! - Environment overrides and platform credentials
//! - Structural validation of the resolved parameters

mod spec;
mod resolver;
mod validator;

pub use spec::{
    ParticipantSection, PlatformSection, ServeSection, TemplateSection, WorkshopParams,
    WorkshopSection,
};
pub use resolver::{
    DEFAULT_PARAM_FILES, ENV_HOST, ENV_TOKEN, ENV_WAREHOUSE_ID, ParamsResolver,
    PlatformCredentials, find_params_file,
};
pub use validator::{ParamsValidator, ValidationError, ValidationResult};
