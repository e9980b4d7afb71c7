//! SQL statement execution client.
//!
//! This module provides the HTTP client for the platform's SQL statement
//! execution REST API. Statements are submitted to a SQL warehouse and
//! polled until they reach a terminal state.

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};
use crate::params::PlatformCredentials;

/// Path of the statement submission endpoint.
const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default limit for polling a single statement, in seconds.
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;

/// Delay between status polls in milliseconds.
const POLL_INTERVAL_MS: u64 = 1000;

/// Longest server-side wait the API accepts before handing back a pending
/// statement, in seconds.
const MAX_SERVER_WAIT_SECS: u64 = 50;

/// Client for the SQL statement execution API.
#[derive(Debug, Clone)]
pub struct StatementClient {
    /// HTTP client.
    client: Client,
    /// Platform base URL without a trailing slash.
    host: String,
    /// Bearer token.
    token: String,
    /// SQL warehouse executing the statements.
    warehouse_id: String,
    /// Server-side wait requested on submission, in seconds.
    wait_secs: u64,
    /// Limit for polling a single statement, in seconds.
    poll_timeout_secs: u64,
}

/// Statement submission request.
#[derive(Debug, Serialize)]
struct SubmitStatementRequest<'a> {
    statement: &'a str,
    warehouse_id: &'a str,
    wait_timeout: String,
    on_wait_timeout: &'static str,
}

/// Statement status response, shared by submission and polling.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    statement_id: String,
    status: StatementStatus,
}

/// Execution status of a statement.
#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: StatementState,
    #[serde(default)]
    error: Option<StatementErrorDetail>,
}

/// Statement lifecycle states reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

/// Error detail attached to a failed statement.
#[derive(Debug, Deserialize)]
struct StatementErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StatementClient {
    /// Creates a new statement client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: &PlatformCredentials) -> ProviderResult<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(
        credentials: &PlatformCredentials,
        timeout_secs: u64,
    ) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: credentials.host.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            warehouse_id: credentials.warehouse_id.clone(),
            wait_secs: timeout_secs.min(MAX_SERVER_WAIT_SECS),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        })
    }

    /// Sets the limit for polling a single statement.
    #[must_use]
    pub const fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Executes a SQL statement to completion.
    ///
    /// Submits the statement to the configured warehouse and polls until a
    /// terminal state is reached. Returns the statement id on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the statement reaches a failed
    /// terminal state, or polling exceeds the configured limit.
    pub async fn execute_statement(&self, statement: &str) -> ProviderResult<String> {
        trace!("Executing statement: {statement}");

        let request = SubmitStatementRequest {
            statement,
            warehouse_id: &self.warehouse_id,
            wait_timeout: format!("{}s", self.wait_secs),
            on_wait_timeout: "CONTINUE",
        };

        let url = format!("{}{STATEMENTS_PATH}", self.host);
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("Request failed: {e}")))?;

        let mut current = Self::parse_response(response).await?;
        let started = Instant::now();

        loop {
            match current.status.state {
                StatementState::Succeeded | StatementState::Closed => {
                    debug!("Statement {} succeeded", current.statement_id);
                    return Ok(current.statement_id);
                }
                StatementState::Failed => {
                    return Err(ProviderError::StatementFailed {
                        statement_id: current.statement_id,
                        message: describe_failure(current.status.error.as_ref()),
                    });
                }
                StatementState::Canceled => {
                    return Err(ProviderError::StatementFailed {
                        statement_id: current.statement_id,
                        message: String::from("Statement was canceled on the server"),
                    });
                }
                StatementState::Pending | StatementState::Running => {
                    let waited = started.elapsed().as_secs();
                    if waited >= self.poll_timeout_secs {
                        return Err(ProviderError::StatementTimeout {
                            statement_id: current.statement_id,
                            waited_secs: waited,
                        });
                    }

                    trace!(
                        "Statement {} still {:?}, polling again",
                        current.statement_id, current.status.state
                    );
                    tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
                    current = self.poll_statement(&current.statement_id).await?;
                }
            }
        }
    }

    /// Fetches the current status of a statement.
    async fn poll_statement(&self, statement_id: &str) -> ProviderResult<StatementResponse> {
        let url = format!("{}{STATEMENTS_PATH}/{statement_id}", self.host);
        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("Poll request failed: {e}")))?;

        Self::parse_response(response).await
    }

    /// Maps an HTTP response to a statement response or an error.
    async fn parse_response(response: reqwest::Response) -> ProviderResult<StatementResponse> {
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::AuthenticationFailed {
                message: String::from("Invalid access token"),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("Failed to parse response: {e}")))
    }
}

/// Renders an error detail into a single message.
fn describe_failure(error: Option<&StatementErrorDetail>) -> String {
    error.map_or_else(
        || String::from("Statement failed without error detail"),
        |detail| match (&detail.error_code, &detail.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => String::from("Statement failed without error detail"),
        },
    )
}
