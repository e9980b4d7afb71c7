//! Workspace REST API client.
//!
//! Implements [`WorkspaceStore`] over the workspace file API: directory
//! creation, base64 file import, and identity lookup for the authenticated
//! principal.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, header};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::params::PlatformCredentials;

use super::store::WorkspaceStore;

/// Directory-creation endpoint.
const MKDIRS_PATH: &str = "/api/2.0/workspace/mkdirs";

/// File-import endpoint.
const IMPORT_PATH: &str = "/api/2.0/workspace/import";

/// Identity endpoint for the authenticated principal.
const CURRENT_USER_PATH: &str = "/api/2.0/preview/scim/v2/Me";

/// Import format accepted for arbitrary template files.
const IMPORT_FORMAT: &str = "AUTO";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST client for the workspace file tree.
#[derive(Debug, Clone)]
pub struct WorkspaceClient {
    /// HTTP client.
    client: Client,
    /// Workspace base URL without a trailing slash.
    host: String,
    /// Personal access token.
    token: String,
}

/// Directory-creation request body.
#[derive(Debug, Serialize)]
struct MkdirsRequest<'a> {
    path: &'a str,
}

/// File-import request body.
#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    path: &'a str,
    content: String,
    format: &'a str,
    overwrite: bool,
}

impl WorkspaceClient {
    /// Creates a client with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: &PlatformCredentials) -> WorkspaceResult<Self> {
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
    ) -> WorkspaceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| WorkspaceError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: credentials.host.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
        })
    }

    /// Builds the full URL for an API path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    /// Sends an authenticated POST and checks the response status.
    async fn send_post<B: Serialize + Sync>(&self, path: &str, body: &B) -> WorkspaceResult<()> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|e| WorkspaceError::network(format!("Request failed: {e}")))?;

        Self::check(response).await?;
        Ok(())
    }

    /// Maps an HTTP response to the workspace error hierarchy.
    async fn check(response: reqwest::Response) -> WorkspaceResult<reqwest::Response> {
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(WorkspaceError::AuthenticationFailed {
                message: String::from("Invalid access token"),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkspaceError::api_error(status.as_u16(), body));
        }

        Ok(response)
    }
}

#[async_trait]
impl WorkspaceStore for WorkspaceClient {
    async fn mkdirs(&self, path: &str) -> WorkspaceResult<()> {
        self.send_post(MKDIRS_PATH, &MkdirsRequest { path }).await?;
        debug!("Ensured workspace directory {path}");
        Ok(())
    }

    async fn import_file(
        &self,
        local: &Path,
        remote: &str,
        overwrite: bool,
    ) -> WorkspaceResult<()> {
        let bytes = tokio::fs::read(local).await.map_err(|e| {
            WorkspaceError::ImportFailed {
                path: local.display().to_string(),
                message: format!("Failed to read local file: {e}"),
            }
        })?;

        let request = ImportRequest {
            path: remote,
            content: STANDARD.encode(bytes),
            format: IMPORT_FORMAT,
            overwrite,
        };

        match self.send_post(IMPORT_PATH, &request).await {
            Ok(()) => {
                debug!("Imported {} to {remote}", local.display());
                Ok(())
            }
            Err(WorkspaceError::ApiRequestFailed { status, message }) => {
                Err(WorkspaceError::ImportFailed {
                    path: remote.to_string(),
                    message: format!("HTTP {status}: {message}"),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn current_user(&self) -> WorkspaceResult<String> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(rename = "userName")]
            user_name: String,
        }

        let response = self
            .client
            .get(self.endpoint(CURRENT_USER_PATH))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| WorkspaceError::network(format!("Request failed: {e}")))?;

        let response = Self::check(response).await?;
        let body: Response = response.json().await.map_err(|e| {
            WorkspaceError::InvalidResponse {
                message: format!("Failed to parse identity response: {e}"),
            }
        })?;

        if body.user_name.is_empty() {
            return Err(WorkspaceError::InvalidResponse {
                message: String::from("Identity response contained an empty user name"),
            });
        }

        Ok(body.user_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(host: &str) -> PlatformCredentials {
        PlatformCredentials {
            host: host.to_string(),
            token: String::from("test-token"),
            warehouse_id: String::from("wh-123"),
        }
    }

    #[tokio::test]
    async fn test_mkdirs_posts_path_with_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MKDIRS_PATH))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "path": "/Workspace/Users/ada@example.com/databricks-mcp-workshop"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        client
            .mkdirs("/Workspace/Users/ada@example.com/databricks-mcp-workshop")
            .await
            .expect("mkdirs succeeds");
    }

    #[tokio::test]
    async fn test_import_file_sends_base64_content() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("app.py");
        std::fs::write(&local, "print('hello')\n").unwrap();

        Mock::given(method("POST"))
            .and(path(IMPORT_PATH))
            .and(body_partial_json(serde_json::json!({
                "path": "/Workspace/Users/ada@example.com/srv/app.py",
                "content": STANDARD.encode("print('hello')\n"),
                "format": "AUTO",
                "overwrite": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        client
            .import_file(&local, "/Workspace/Users/ada@example.com/srv/app.py", true)
            .await
            .expect("import succeeds");
    }

    #[tokio::test]
    async fn test_import_failure_names_the_remote_path() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("app.py");
        std::fs::write(&local, "x = 1\n").unwrap();

        Mock::given(method("POST"))
            .and(path(IMPORT_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_PARAMETER_VALUE"))
            .mount(&server)
            .await;

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        let err = client
            .import_file(&local, "/Workspace/Users/ada@example.com/srv/app.py", true)
            .await
            .expect_err("import fails");

        match err {
            WorkspaceError::ImportFailed { path, message } => {
                assert_eq!(path, "/Workspace/Users/ada@example.com/srv/app.py");
                assert!(message.contains("400"));
                assert!(message.contains("INVALID_PARAMETER_VALUE"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_local_file_fails_without_a_request() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        let err = client
            .import_file(&dir.path().join("absent.py"), "/Workspace/x", true)
            .await
            .expect_err("missing file fails");

        assert!(matches!(err, WorkspaceError::ImportFailed { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_current_user_returns_user_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_USER_PATH))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "12345",
                "userName": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        let user = client.current_user().await.expect("identity lookup succeeds");
        assert_eq!(user, "ada@example.com");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MKDIRS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let client = WorkspaceClient::new(&credentials(&server.uri())).unwrap();
        let err = client.mkdirs("/Workspace/x").await.expect_err("auth fails");

        assert!(matches!(err, WorkspaceError::AuthenticationFailed { .. }));
    }
}
