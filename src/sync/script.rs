//! Deployment script rendering.
//!
//! Turns a sync plan into an executable bash script built on the
//! `databricks` CLI. Rendering is pure text generation, so operators can
//! review exactly what will run before anything touches the workspace.

use super::plan::SyncPlan;

/// Renders a bash script that applies `plan` when executed.
///
/// The script creates every destination directory, then uploads each
/// entry with overwrite. Both operations are idempotent, so the script is
/// safe to rerun after a partial failure.
#[must_use]
pub fn render_script(plan: &SyncPlan, target_label: &str) -> String {
    let mut script = String::new();

    script.push_str("#!/bin/bash\n");
    script.push_str(&format!("# MCP template sync script for {target_label}\n"));
    script.push_str(&format!(
        "# Plan {}: {} files from {} to {}\n",
        plan.short_fingerprint(),
        plan.file_count(),
        plan.source.display(),
        plan.dest
    ));
    script.push_str("\nset -euo pipefail\n\n");
    script.push_str(&format!(
        "echo \"🚀 Deploying custom MCP server template for {target_label}\"\n\n"
    ));

    script.push_str("# Create workspace directories\n");
    for dir in plan.destination_dirs() {
        script.push_str(&format!("databricks workspace mkdirs \"{dir}\"\n"));
    }

    script.push_str("\necho \"📁 Syncing template files...\"\n");
    for entry in &plan.entries {
        script.push_str(&format!(
            "echo \"  Uploading {} -> {}\"\n",
            entry.relative, entry.remote
        ));
        script.push_str(&format!(
            "databricks workspace import \"{}\" \"{}\" --format AUTO --overwrite\n",
            entry.local.display(),
            entry.remote
        ));
    }

    script.push_str(&format!(
        "\necho \"✅ MCP server template deployed to {}\"\n",
        plan.dest
    ));

    script
}
