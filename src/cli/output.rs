//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::params::ValidationResult;
use crate::provision::{ProvisionPlan, StatusReport};
use crate::sync::{SyncPlan, SyncReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Planned step row for table display.
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Step")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Executed step row for table display.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Step")]
    id: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

/// Sync entry row for table display.
#[derive(Tabled)]
struct SyncEntryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Digest")]
    digest: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a provisioning plan for display.
    #[must_use]
    pub fn format_provision_plan(&self, plan: &ProvisionPlan) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&PlanJson::from(plan)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_provision_plan_text(plan),
        }
    }

    /// Formats a provisioning plan as text.
    fn format_provision_plan_text(plan: &ProvisionPlan) -> String {
        if plan.is_empty() {
            return format!("{} Nothing to do for catalog '{}'.\n", "✓".green(), plan.catalog);
        }

        let mut output = String::new();

        let _ = write!(
            output,
            "\n📋 Plan for catalog '{}' ({} steps)\n\n",
            plan.catalog,
            plan.step_count()
        );

        let rows: Vec<StepRow> = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepRow {
                index: i + 1,
                id: step.id(),
                description: step.description(),
            })
            .collect();

        let table = Table::new(rows).to_string();
        output.push_str(&table);
        output.push('\n');

        output
    }

    /// Formats a completed run report for display.
    #[must_use]
    pub fn format_report(&self, report: &StatusReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a run report as text.
    fn format_report_text(report: &StatusReport) -> String {
        let mut output = format!(
            "{} Run {} for catalog '{}' completed in {} ms\n",
            "✓".green(),
            report.run_id,
            report.catalog,
            report.duration_ms()
        );

        if report.steps.is_empty() {
            output.push_str("\n   No steps executed.\n");
            return output;
        }

        let rows: Vec<OutcomeRow> = report
            .steps
            .iter()
            .enumerate()
            .map(|(i, outcome)| OutcomeRow {
                index: i + 1,
                id: outcome.step.clone(),
                duration: format!("{} ms", outcome.duration_ms),
            })
            .collect();

        output.push('\n');
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        output
    }

    /// Formats a sync plan for display.
    #[must_use]
    pub fn format_sync_plan(&self, plan: &SyncPlan) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&SyncPlanJson::from(plan)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_sync_plan_text(plan),
        }
    }

    /// Formats a sync plan as text.
    fn format_sync_plan_text(plan: &SyncPlan) -> String {
        if plan.is_empty() {
            return format!(
                "{} No files match the template patterns under '{}'.\n",
                "⚠".yellow(),
                plan.source.display()
            );
        }

        let mut output = String::new();

        let _ = write!(
            output,
            "\n📦 Sync plan {} ({} files)\n   {} -> {}\n\n",
            plan.short_fingerprint(),
            plan.file_count(),
            plan.source.display(),
            plan.dest
        );

        let rows: Vec<SyncEntryRow> = plan
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| SyncEntryRow {
                index: i + 1,
                file: entry.relative.clone(),
                destination: entry.remote.clone(),
                digest: Self::truncate(&entry.digest, 12),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        output
    }

    /// Formats an upload report for display.
    #[must_use]
    pub fn format_sync_report(&self, report: &SyncReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                format!(
                    "{} Uploaded {} files to {}\n",
                    "✓".green(),
                    report.uploaded,
                    report.dest
                )
            }
        }
    }

    /// Formats a parameter validation result for display.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ValidationJson::from(result)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_validation_text(result, show_warnings),
        }
    }

    /// Formats a validation result as text.
    fn format_validation_text(result: &ValidationResult, show_warnings: bool) -> String {
        let mut output = if result.is_valid() {
            format!("{} Parameters are valid.\n", "✓".green())
        } else {
            format!(
                "{} Parameters have {} error(s):\n",
                "✗".red(),
                result.error_count()
            )
        };

        for error in &result.errors {
            let _ = writeln!(output, "   - {error}");
        }

        if show_warnings && !result.warnings.is_empty() {
            let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
            for warning in &result.warnings {
                let _ = writeln!(output, "   - {warning}");
            }
        }

        output
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "success", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✓".green()),
        }
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "error", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✗".red()),
        }
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "warning", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "⚠".yellow()),
        }
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else {
            format!("{}...", &s[..max_len - 3])
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct PlanJson {
    catalog: String,
    step_count: usize,
    steps: Vec<StepJson>,
}

#[derive(serde::Serialize)]
struct StepJson {
    id: String,
    description: String,
}

impl From<&ProvisionPlan> for PlanJson {
    fn from(plan: &ProvisionPlan) -> Self {
        Self {
            catalog: plan.catalog.clone(),
            step_count: plan.step_count(),
            steps: plan
                .steps
                .iter()
                .map(|step| StepJson {
                    id: step.id(),
                    description: step.description(),
                })
                .collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct SyncPlanJson {
    source: String,
    dest: String,
    fingerprint: String,
    file_count: usize,
    files: Vec<SyncFileJson>,
}

#[derive(serde::Serialize)]
struct SyncFileJson {
    relative: String,
    remote: String,
    digest: String,
}

impl From<&SyncPlan> for SyncPlanJson {
    fn from(plan: &SyncPlan) -> Self {
        Self {
            source: plan.source.display().to_string(),
            dest: plan.dest.clone(),
            fingerprint: plan.fingerprint(),
            file_count: plan.file_count(),
            files: plan
                .entries
                .iter()
                .map(|entry| SyncFileJson {
                    relative: entry.relative.clone(),
                    remote: entry.remote.clone(),
                    digest: entry.digest.clone(),
                })
                .collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationJson {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl From<&ValidationResult> for ValidationJson {
    fn from(result: &ValidationResult) -> Self {
        Self {
            valid: result.is_valid(),
            errors: result.errors.iter().map(ToString::to_string).collect(),
            warnings: result.warnings.clone(),
        }
    }
}
