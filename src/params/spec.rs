//! Operator parameter types for the workshop toolkit.
//!
//! This module defines the structs that map to the optional `workshop.yaml`
//! file. Every field carries a literal default so a missing file, section,
//! or key resolves to the standard workshop layout instead of failing.

use serde::{Deserialize, Serialize};

/// The root parameter structure for a workshop run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WorkshopParams {
    /// Catalog, schema, and table layout.
    pub workshop: WorkshopSection,
    /// Participant identity used for scripts and workspace paths.
    pub participant: ParticipantSection,
    /// Template discovery settings.
    pub template: TemplateSection,
    /// Platform request tuning.
    pub platform: PlatformSection,
    /// Static asset server settings.
    pub serve: ServeSection,
}

/// Catalog, schema, and table layout for the workshop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkshopSection {
    /// Name of the workshop catalog.
    pub catalog: String,
    /// Name of the schema holding the workshop tables.
    pub schema: String,
    /// Tables dropped during teardown, in drop order.
    pub tables: Vec<String>,
}

/// Participant identity settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParticipantSection {
    /// Participant prefix used to label generated scripts.
    pub prefix: String,
    /// Name of the MCP server directory created in the workspace.
    pub server_name: String,
}

/// Template discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSection {
    /// Local directory holding the MCP server template.
    pub source: String,
    /// File extensions included in a sync plan.
    pub patterns: Vec<String>,
}

/// Platform request tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlatformSection {
    /// Timeout for a single API request, in seconds.
    pub request_timeout_secs: u64,
    /// Time limit for one provisioning step, in seconds.
    pub step_timeout_secs: u64,
}

/// Static asset server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServeSection {
    /// Directory served as the site root.
    pub root: String,
    /// Listen address in `host:port` form.
    pub listen: String,
}

// Default value functions

fn default_catalog() -> String {
    String::from("mcp_workshop")
}

fn default_schema() -> String {
    String::from("default")
}

fn default_tables() -> Vec<String> {
    vec![
        String::from("sales"),
        String::from("customers"),
        String::from("products"),
    ]
}

fn default_prefix() -> String {
    String::from("default")
}

fn default_server_name() -> String {
    String::from("databricks-mcp-workshop")
}

fn default_template_source() -> String {
    String::from("./custom-mcp-template")
}

fn default_patterns() -> Vec<String> {
    vec![
        String::from("py"),
        String::from("yaml"),
        String::from("toml"),
        String::from("md"),
    ]
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_step_timeout_secs() -> u64 {
    60
}

fn default_serve_root() -> String {
    String::from("./static")
}

fn default_listen() -> String {
    String::from("0.0.0.0:8000")
}

impl Default for WorkshopSection {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            schema: default_schema(),
            tables: default_tables(),
        }
    }
}

impl Default for ParticipantSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            server_name: default_server_name(),
        }
    }
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            source: default_template_source(),
            patterns: default_patterns(),
        }
    }
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            step_timeout_secs: default_step_timeout_secs(),
        }
    }
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            root: default_serve_root(),
            listen: default_listen(),
        }
    }
}

impl WorkshopSection {
    /// Returns the fully qualified schema name.
    #[must_use]
    pub fn qualified_schema(&self) -> String {
        format!("{}.{}", self.catalog, self.schema)
    }

    /// Returns table names as string slices.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(String::as_str).collect()
    }
}

impl TemplateSection {
    /// Returns patterns normalized to bare lowercase extensions.
    ///
    /// Leading dots are accepted in the file for operator convenience
    /// (`.py` and `py` are equivalent).
    #[must_use]
    pub fn normalized_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| p.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }
}
