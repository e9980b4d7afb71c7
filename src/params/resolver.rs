//! Parameter resolution from files and the environment.
//!
//! This module loads operator parameters from an optional YAML file, applies
//! environment overrides, and resolves platform credentials. File and field
//! absence never fails; only credentials have no safe default.

use crate::error::{ParamsError, Result, WorkshopError};
use std::path::Path;
use tracing::{debug, info};

use super::spec::WorkshopParams;

/// Environment variable holding the platform URL.
pub const ENV_HOST: &str = "DATABRICKS_HOST";
/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "DATABRICKS_TOKEN";
/// Environment variable holding the SQL warehouse identifier.
pub const ENV_WAREHOUSE_ID: &str = "DATABRICKS_WAREHOUSE_ID";

/// Resolver for operator parameters.
#[derive(Debug, Default)]
pub struct ParamsResolver {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ParamsResolver {
    /// Creates a new parameter resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads parameters from an explicitly named YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<WorkshopParams> {
        let path = path.as_ref();
        info!("Loading parameters from: {}", path.display());

        if !path.exists() {
            return Err(WorkshopError::Params(ParamsError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkshopError::Params(ParamsError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses parameters from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<WorkshopParams> {
        debug!("Parsing YAML parameters");

        let params: WorkshopParams = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            WorkshopError::Params(ParamsError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Resolved parameters for catalog: {}", params.workshop.catalog);
        Ok(params)
    }

    /// Resolves parameters from an optional file path.
    ///
    /// An explicit path must exist. With no path given, the default file
    /// names are searched upward from the current directory; when nothing is
    /// found the built-in defaults are used. Environment overrides apply in
    /// every case.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any file fails to
    /// parse.
    pub fn resolve(&self, path: Option<&Path>) -> Result<WorkshopParams> {
        let mut params = match path {
            Some(explicit) => self.load_file(explicit)?,
            None => {
                let start = self
                    .base_path
                    .clone()
                    .unwrap_or_else(|| std::path::PathBuf::from("."));
                match find_params_file(&start) {
                    Some(found) => self.load_file(found)?,
                    None => {
                        debug!("No parameter file found, using defaults");
                        WorkshopParams::default()
                    }
                }
            }
        };

        Self::apply_env_overrides(&mut params);
        Ok(params)
    }

    /// Applies environment variable overrides to the parameters.
    fn apply_env_overrides(params: &mut WorkshopParams) {
        Self::apply_overrides_with(params, |name| std::env::var(name).ok());
    }

    /// Applies overrides through the given variable lookup.
    fn apply_overrides_with(
        params: &mut WorkshopParams,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        if let Some(catalog) = lookup("WORKSHOP_CATALOG") {
            debug!("Overriding workshop.catalog from environment");
            params.workshop.catalog = catalog;
        }

        if let Some(schema) = lookup("WORKSHOP_SCHEMA") {
            debug!("Overriding workshop.schema from environment");
            params.workshop.schema = schema;
        }

        if let Some(prefix) = lookup("WORKSHOP_PARTICIPANT_PREFIX") {
            debug!("Overriding participant.prefix from environment");
            params.participant.prefix = prefix;
        }

        if let Some(server_name) = lookup("WORKSHOP_SERVER_NAME") {
            debug!("Overriding participant.server_name from environment");
            params.participant.server_name = server_name;
        }

        if let Some(source) = lookup("WORKSHOP_TEMPLATE_SOURCE") {
            debug!("Overriding template.source from environment");
            params.template.source = source;
        }

        if let Some(root) = lookup("WORKSHOP_SERVE_ROOT") {
            debug!("Overriding serve.root from environment");
            params.serve.root = root;
        }

        if let Some(listen) = lookup("WORKSHOP_SERVE_LISTEN") {
            debug!("Overriding serve.listen from environment");
            params.serve.listen = listen;
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                WorkshopError::Params(ParamsError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Platform credentials resolved from the environment.
///
/// Credentials never appear in the parameter file.
#[derive(Debug, Clone)]
pub struct PlatformCredentials {
    /// Base URL of the platform, e.g. `https://adb-123.azuredatabricks.net`.
    pub host: String,
    /// Bearer token for API requests.
    pub token: String,
    /// Identifier of the SQL warehouse executing statements.
    pub warehouse_id: String,
}

impl PlatformCredentials {
    /// Resolves credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: required_env(ENV_HOST)?,
            token: required_env(ENV_TOKEN)?,
            warehouse_id: required_env(ENV_WAREHOUSE_ID)?,
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| {
        WorkshopError::Params(ParamsError::MissingEnvVar {
            name: name.to_string(),
        })
    })
}

/// Default parameter file names to search for.
pub const DEFAULT_PARAM_FILES: &[&str] = &["workshop.yaml", "workshop.yml"];

/// Finds a parameter file in the given directory or its ancestors.
#[must_use]
pub fn find_params_file(start_dir: impl AsRef<Path>) -> Option<std::path::PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_PARAM_FILES {
            let params_path = current.join(filename);
            if params_path.exists() {
                info!("Found parameter file: {}", params_path.display());
                return Some(params_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_yaml_uses_defaults() {
        let resolver = ParamsResolver::new();
        let params = resolver.parse_yaml("{}", None).expect("empty mapping parses");
        assert_eq!(params, WorkshopParams::default());
    }

    #[test]
    fn test_parse_partial_yaml_keeps_other_defaults() {
        let yaml = r"
workshop:
  catalog: team_demo
participant:
  prefix: team-a
";
        let resolver = ParamsResolver::new();
        let params = resolver.parse_yaml(yaml, None).expect("partial yaml parses");
        assert_eq!(params.workshop.catalog, "team_demo");
        assert_eq!(params.workshop.schema, "default");
        assert_eq!(params.participant.prefix, "team-a");
        assert_eq!(params.participant.server_name, "databricks-mcp-workshop");
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
workshop:
  catalog: sales_lab
  schema: core
  tables: [orders, refunds]
participant:
  prefix: row-3
  server_name: sales-mcp
template:
  source: ./mcp-src
  patterns: [py, md]
platform:
  request_timeout_secs: 10
  step_timeout_secs: 20
serve:
  root: ./site
  listen: "127.0.0.1:9000"
"#;
        let resolver = ParamsResolver::new();
        let params = resolver.parse_yaml(yaml, None).expect("full yaml parses");
        assert_eq!(params.workshop.tables, vec!["orders", "refunds"]);
        assert_eq!(params.platform.request_timeout_secs, 10);
        assert_eq!(params.serve.listen, "127.0.0.1:9000");
    }

    #[test]
    fn test_load_file_missing_is_an_error() {
        let resolver = ParamsResolver::new();
        let result = resolver.load_file("/nonexistent/workshop.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_without_file_yields_defaults() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let resolver = ParamsResolver::new().with_base_path(dir.path());
        let params = resolver.resolve(None).expect("resolve with no file");
        assert_eq!(params.workshop.catalog, "mcp_workshop");
    }

    #[test]
    fn test_resolve_finds_file_in_base_path() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        std::fs::write(
            dir.path().join("workshop.yaml"),
            "workshop:\n  catalog: found_one\n",
        )
        .expect("write params file");

        let resolver = ParamsResolver::new().with_base_path(dir.path());
        let params = resolver.resolve(None).expect("resolve from base path");
        assert_eq!(params.workshop.catalog, "found_one");
    }

    #[test]
    fn test_overrides_replace_file_loaded_values() {
        let yaml = r#"
workshop:
  catalog: file_catalog
  schema: file_schema
serve:
  listen: "127.0.0.1:1111"
"#;
        let resolver = ParamsResolver::new();
        let mut params = resolver.parse_yaml(yaml, None).expect("yaml parses");

        ParamsResolver::apply_overrides_with(&mut params, |name| match name {
            "WORKSHOP_CATALOG" => Some("env_catalog".to_string()),
            "WORKSHOP_SERVE_LISTEN" => Some("0.0.0.0:9000".to_string()),
            _ => None,
        });

        assert_eq!(params.workshop.catalog, "env_catalog");
        assert_eq!(params.serve.listen, "0.0.0.0:9000");
        // Names without an override keep their file-loaded values.
        assert_eq!(params.workshop.schema, "file_schema");
    }

    #[test]
    fn test_every_override_name_is_honored() {
        let mut params = WorkshopParams::default();

        ParamsResolver::apply_overrides_with(&mut params, |name| Some(format!("set:{name}")));

        assert_eq!(params.workshop.catalog, "set:WORKSHOP_CATALOG");
        assert_eq!(params.workshop.schema, "set:WORKSHOP_SCHEMA");
        assert_eq!(params.participant.prefix, "set:WORKSHOP_PARTICIPANT_PREFIX");
        assert_eq!(params.participant.server_name, "set:WORKSHOP_SERVER_NAME");
        assert_eq!(params.template.source, "set:WORKSHOP_TEMPLATE_SOURCE");
        assert_eq!(params.serve.root, "set:WORKSHOP_SERVE_ROOT");
        assert_eq!(params.serve.listen, "set:WORKSHOP_SERVE_LISTEN");
    }

    #[test]
    fn test_absent_overrides_change_nothing() {
        let mut params = WorkshopParams::default();
        ParamsResolver::apply_overrides_with(&mut params, |_| None);
        assert_eq!(params, WorkshopParams::default());
    }
}
