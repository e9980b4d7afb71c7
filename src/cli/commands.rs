//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// workshopctl - workshop environment provisioning toolkit.
#[derive(Parser, Debug)]
#[command(name = "workshopctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the workshop parameter file.
    #[arg(short, long, global = true, env = "WORKSHOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the workshop catalog and schema.
    Provision {
        /// Catalog name (overrides the parameter file).
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Drop workshop tables, optionally cascading to schema and catalog.
    Teardown {
        /// Catalog name (overrides the parameter file).
        #[arg(long)]
        catalog: Option<String>,

        /// Table to drop (repeatable; overrides the parameter file).
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Also drop the schema and catalog after the tables.
        #[arg(long)]
        cascade: bool,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Plan, render, or push the MCP server template.
    Template {
        /// Template subcommand.
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Validate the workshop parameter file.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Serve the workshop frontend directory over HTTP.
    Serve {
        /// Directory to serve (overrides the parameter file).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Listen address (overrides the parameter file).
        #[arg(long)]
        listen: Option<String>,
    },
}

/// Template deployment subcommands.
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Show the upload plan for the template directory.
    Plan {
        /// Destination workspace path (defaults to the current user's
        /// workspace directory for the configured server name).
        #[arg(long)]
        dest: Option<String>,
    },

    /// Render the deployment script for the current plan.
    Render {
        /// Destination workspace path (defaults to the current user's
        /// workspace directory for the configured server name).
        #[arg(long)]
        dest: Option<String>,

        /// Write the script to a file instead of printing it.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Upload the template directly through the workspace API.
    Push {
        /// Destination workspace path (defaults to the current user's
        /// workspace directory for the configured server name).
        #[arg(long)]
        dest: Option<String>,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
