//! Static asset server for the workshop frontend.
//!
//! One catch-all route: every request path resolves against a configured
//! root directory, directories fall back to their `index.html`, and
//! misses are plain 404s. There is no API surface.

use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ParamsError, Result, ServeError};
use crate::params::ServeSection;

/// Settings for one server instance.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Directory served as the site root.
    pub root: PathBuf,
    /// Listen address.
    pub listen: SocketAddr,
}

impl ServeConfig {
    /// Builds a config from the serve parameter section.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address is not `host:port`.
    pub fn from_section(section: &ServeSection) -> Result<Self> {
        let listen = section.listen.parse().map_err(|_| {
            ParamsError::validation(
                format!("Invalid listen address '{}'", section.listen),
                "serve.listen",
            )
        })?;

        Ok(Self {
            root: PathBuf::from(&section.root),
            listen,
        })
    }
}

/// Builds the router mapping every path to a file under `root`.
#[must_use]
pub fn router(root: &Path) -> Router {
    let assets = ServeDir::new(root).append_index_html_on_directories(true);

    Router::new()
        .fallback_service(assets)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Runs the server until the process is stopped.
///
/// # Errors
///
/// Returns an error if the asset root is missing or the listen address
/// cannot be bound.
pub async fn serve(config: &ServeConfig) -> Result<()> {
    if !config.root.is_dir() {
        return Err(ServeError::RootNotFound {
            path: config.root.clone(),
        }
        .into());
    }

    let app = router(&config.root);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|e| ServeError::BindFailed {
            addr: config.listen.to_string(),
            message: e.to_string(),
        })?;

    info!("Serving {} on http://{}", config.root.display(), config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
