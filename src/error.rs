//! Error types for the workshop provisioning toolkit.
//!
//! This module provides a comprehensive error hierarchy for all operations
//! in the workshop lifecycle: parameter resolution, catalog provisioning,
//! template synchronization, workspace uploads, and static asset serving.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the workshop provisioning toolkit.
#[derive(Debug, Error)]
pub enum WorkshopError {
    /// Operator parameter errors.
    #[error("Parameter error: {0}")]
    Params(#[from] ParamsError),

    /// SQL statement provider errors.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provisioning workflow errors.
    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    /// Template sync errors.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Workspace file store errors.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Static asset server errors.
    #[error("Serve error: {0}")]
    Serve(#[from] ServeError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Operator parameter errors.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// An explicitly requested parameter file was not found.
    #[error("Parameter file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The parameter file could not be parsed.
    #[error("Failed to parse parameters: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Parameter validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Errors from the SQL statement provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed.
    #[error("Provider authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Provider API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A submitted statement reached a failed terminal state.
    #[error("Statement {statement_id} failed: {message}")]
    StatementFailed {
        /// Identifier of the failed statement.
        statement_id: String,
        /// Error message reported by the provider.
        message: String,
    },

    /// A submitted statement did not reach a terminal state in time.
    #[error("Statement {statement_id} still running after {waited_secs} seconds")]
    StatementTimeout {
        /// Identifier of the pending statement.
        statement_id: String,
        /// Seconds spent polling.
        waited_secs: u64,
    },

    /// Network error.
    #[error("Network error communicating with the provider: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from the provider API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Provisioning workflow errors.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A step failed; remaining steps were not executed.
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        /// Identifier of the failed step.
        step: String,
        /// The underlying provider error.
        source: ProviderError,
    },

    /// A step exceeded the configured time limit.
    #[error("Step '{step}' timed out after {limit_secs} seconds")]
    StepTimeout {
        /// Identifier of the step that timed out.
        step: String,
        /// The configured limit in seconds.
        limit_secs: u64,
    },

    /// The run was cancelled before the step executed.
    #[error("Run cancelled before step '{step}'")]
    Cancelled {
        /// Identifier of the step that was about to run.
        step: String,
    },
}

/// Template sync errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The template source directory does not exist.
    #[error("Template source not found: {path}")]
    SourceNotFound {
        /// Path to the missing source directory.
        path: PathBuf,
    },

    /// A file under the source directory could not be read.
    #[error("Failed to read {path}: {message}")]
    ReadFailed {
        /// Path that could not be read.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

/// Workspace file store errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Authentication failed.
    #[error("Workspace authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Workspace API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A file upload was rejected.
    #[error("Failed to import {path}: {message}")]
    ImportFailed {
        /// Workspace path that was being written.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// Network error.
    #[error("Network error communicating with the workspace: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from the workspace API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Static asset server errors.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The configured asset root does not exist.
    #[error("Asset root not found: {path}")]
    RootNotFound {
        /// Path to the missing asset root.
        path: PathBuf,
    },

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {message}")]
    BindFailed {
        /// The requested listen address.
        addr: String,
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for workshop operations.
pub type Result<T> = std::result::Result<T, WorkshopError>;

/// Result type alias for SQL statement provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Result type alias for workspace file store operations.
pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;

impl WorkshopError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error stems from rejected platform credentials.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(ProviderError::AuthenticationFailed { .. })
                | Self::Workspace(WorkspaceError::AuthenticationFailed { .. })
                | Self::Provision(ProvisionError::StepFailed {
                    source: ProviderError::AuthenticationFailed { .. },
                    ..
                })
        )
    }

    /// Returns the identifier of the provisioning step that failed, if any.
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Provision(
                ProvisionError::StepFailed { step, .. }
                | ProvisionError::StepTimeout { step, .. }
                | ProvisionError::Cancelled { step },
            ) => Some(step),
            _ => None,
        }
    }
}

impl ParamsError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl ProviderError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl WorkspaceError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }
}

impl ProvisionError {
    /// Creates a step failure wrapping the underlying provider error.
    #[must_use]
    pub fn step_failed(step: impl Into<String>, source: ProviderError) -> Self {
        Self::StepFailed {
            step: step.into(),
            source,
        }
    }

    /// Creates a cancellation error naming the step that was about to run.
    #[must_use]
    pub fn cancelled(step: impl Into<String>) -> Self {
        Self::Cancelled { step: step.into() }
    }
}
