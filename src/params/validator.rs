//! Parameter validation for workshop runs.
//!
//! This module checks resolved parameters for structural problems before any
//! API call is made: identifier shape, duplicate tables, pattern syntax, and
//! listen address format.

use crate::error::{ParamsError, Result, WorkshopError};
use std::collections::HashSet;
use tracing::debug;

use super::spec::WorkshopParams;

/// Validator for resolved workshop parameters.
#[derive(Debug, Default)]
pub struct ParamsValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ParamsValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates resolved parameters.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the first failed field when any check fails.
    pub fn validate(&self, params: &WorkshopParams) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_workshop(params, &mut result);
        Self::validate_participant(params, &mut result);
        Self::validate_template(params, &mut result);
        Self::validate_platform(params, &mut result);
        Self::validate_serve(params, &mut result);

        if result.errors.is_empty() {
            debug!("Parameter validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(WorkshopError::Params(ParamsError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Validates the catalog, schema, and table layout.
    fn validate_workshop(params: &WorkshopParams, result: &mut ValidationResult) {
        if !is_valid_identifier(&params.workshop.catalog) {
            result.errors.push(ValidationError {
                field: String::from("workshop.catalog"),
                message: format!(
                    "Catalog name '{}' is invalid. Must be lowercase alphanumeric with underscores.",
                    params.workshop.catalog
                ),
            });
        }

        if !is_valid_identifier(&params.workshop.schema) {
            result.errors.push(ValidationError {
                field: String::from("workshop.schema"),
                message: format!(
                    "Schema name '{}' is invalid. Must be lowercase alphanumeric with underscores.",
                    params.workshop.schema
                ),
            });
        }

        if params.workshop.tables.is_empty() {
            result.warnings.push(String::from(
                "No tables defined; teardown without --cascade will be a no-op",
            ));
        }

        let mut seen_tables = HashSet::new();
        for (i, table) in params.workshop.tables.iter().enumerate() {
            if !is_valid_identifier(table) {
                result.errors.push(ValidationError {
                    field: format!("workshop.tables[{i}]"),
                    message: format!(
                        "Table name '{table}' is invalid. Must be lowercase alphanumeric with underscores."
                    ),
                });
            }

            if !seen_tables.insert(table) {
                result.errors.push(ValidationError {
                    field: format!("workshop.tables[{i}]"),
                    message: format!("Duplicate table name: {table}"),
                });
            }
        }
    }

    /// Validates the participant identity settings.
    fn validate_participant(params: &WorkshopParams, result: &mut ValidationResult) {
        if params.participant.prefix.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("participant.prefix"),
                message: String::from("Participant prefix cannot be empty"),
            });
        } else if params.participant.prefix.chars().any(char::is_whitespace) {
            result.errors.push(ValidationError {
                field: String::from("participant.prefix"),
                message: String::from("Participant prefix cannot contain whitespace"),
            });
        }

        if params.participant.server_name.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("participant.server_name"),
                message: String::from("Server name cannot be empty"),
            });
        } else if params.participant.server_name.contains('/') {
            result.errors.push(ValidationError {
                field: String::from("participant.server_name"),
                message: String::from("Server name cannot contain '/'"),
            });
        }
    }

    /// Validates template discovery settings.
    fn validate_template(params: &WorkshopParams, result: &mut ValidationResult) {
        if params.template.source.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("template.source"),
                message: String::from("Template source cannot be empty"),
            });
        }

        if params.template.patterns.is_empty() {
            result.warnings.push(String::from(
                "No template patterns defined; sync plans will be empty",
            ));
        }

        for (i, pattern) in params.template.patterns.iter().enumerate() {
            let bare = pattern.trim_start_matches('.');
            if bare.is_empty() || bare.contains('/') || bare.contains('*') {
                result.errors.push(ValidationError {
                    field: format!("template.patterns[{i}]"),
                    message: format!(
                        "Pattern '{pattern}' is invalid. Use a bare extension such as 'py'."
                    ),
                });
            }
        }
    }

    /// Validates platform request tuning.
    fn validate_platform(params: &WorkshopParams, result: &mut ValidationResult) {
        if params.platform.request_timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("platform.request_timeout_secs"),
                message: String::from("Request timeout must be at least 1 second"),
            });
        }

        if params.platform.step_timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("platform.step_timeout_secs"),
                message: String::from("Step timeout must be at least 1 second"),
            });
        }

        if params.platform.step_timeout_secs < params.platform.request_timeout_secs {
            result.warnings.push(format!(
                "platform.step_timeout_secs ({}) is shorter than request_timeout_secs ({}); steps may time out mid-request",
                params.platform.step_timeout_secs, params.platform.request_timeout_secs
            ));
        }
    }

    /// Validates static server settings.
    fn validate_serve(params: &WorkshopParams, result: &mut ValidationResult) {
        if params.serve.root.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("serve.root"),
                message: String::from("Serve root cannot be empty"),
            });
        }

        if params.serve.listen.parse::<std::net::SocketAddr>().is_err() {
            result.errors.push(ValidationError {
                field: String::from("serve.listen"),
                message: format!(
                    "Listen address '{}' is invalid. Expected host:port, e.g. 0.0.0.0:8000",
                    params.serve.listen
                ),
            });
        }
    }
}

/// Validates that a name is usable as a SQL object identifier.
/// Names must be lowercase alphanumeric with underscores, starting with a letter.
fn is_valid_identifier(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let mut chars = name.chars();

    if let Some(first) = chars.next() {
        if !first.is_ascii_lowercase() {
            return false;
        }
    }

    for c in chars {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_' {
            return false;
        }
    }

    true
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("mcp_workshop"));
        assert!(is_valid_identifier("sales"));
        assert!(is_valid_identifier("a"));
        assert!(is_valid_identifier("t2_copy"));
    }

    #[test]
    fn test_invalid_identifier() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("Sales")); // uppercase
        assert!(!is_valid_identifier("2sales")); // starts with digit
        assert!(!is_valid_identifier("my-table")); // hyphen
        assert!(!is_valid_identifier("a b")); // whitespace
    }

    #[test]
    fn test_default_params_are_valid() {
        let validator = ParamsValidator::new();
        let result = validator
            .validate(&WorkshopParams::default())
            .expect("defaults validate");
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut params = WorkshopParams::default();
        params.workshop.tables = vec![String::from("sales"), String::from("sales")];

        let validator = ParamsValidator::new();
        assert!(validator.validate(&params).is_err());
    }

    #[test]
    fn test_bad_listen_address_rejected() {
        let mut params = WorkshopParams::default();
        params.serve.listen = String::from("not-an-address");

        let validator = ParamsValidator::new();
        assert!(validator.validate(&params).is_err());
    }

    #[test]
    fn test_empty_tables_is_a_warning_not_an_error() {
        let mut params = WorkshopParams::default();
        params.workshop.tables.clear();

        let validator = ParamsValidator::new();
        let result = validator.validate(&params).expect("empty tables still valid");
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 1);
    }
}
