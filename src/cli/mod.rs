//! CLI module for the workshop toolkit.
//!
//! This module provides the command-line interface for provisioning
//! workshop environments and deploying the MCP server template.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, TemplateCommands};
pub use output::OutputFormatter;
