//! workshopctl CLI entrypoint.
//!
//! This is the main entrypoint for the workshopctl command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use workshopctl::catalog::{SqlCatalogProvider, StatementClient};
use workshopctl::cli::{Cli, Commands, OutputFormatter, TemplateCommands};
use workshopctl::error::Result;
use workshopctl::params::{ParamsResolver, ParamsValidator, PlatformCredentials, WorkshopParams};
use workshopctl::provision::{CancelFlag, ProvisionPlan, StepRunner};
use workshopctl::serve::{self, ServeConfig};
use workshopctl::sync::{render_script, SyncExecutor, SyncPlan};
use workshopctl::workspace::{WorkspaceClient, WorkspaceStore};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_auth_failure() {
                eprintln!(
                    "Check DATABRICKS_HOST, DATABRICKS_TOKEN, and DATABRICKS_WAREHOUSE_ID \
                     in your environment or .env file."
                );
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Provision { catalog } => {
            cmd_provision(cli.config.as_ref(), catalog, &formatter).await
        }
        Commands::Teardown {
            catalog,
            tables,
            cascade,
            yes,
        } => cmd_teardown(cli.config.as_ref(), catalog, tables, cascade, yes, &formatter).await,
        Commands::Template { command } => {
            cmd_template(cli.config.as_ref(), command, &formatter).await
        }
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings, &formatter),
        Commands::Serve { root, listen } => cmd_serve(cli.config.as_ref(), root, listen).await,
    }
}

/// Provision the workshop catalog and schema.
async fn cmd_provision(
    config_path: Option<&PathBuf>,
    catalog: Option<String>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut params = resolve_params(config_path)?;
    if let Some(catalog) = catalog {
        params.workshop.catalog = catalog;
    }
    ParamsValidator::new().validate(&params)?;

    let plan = ProvisionPlan::provision(&params.workshop.catalog, &params.workshop.schema);
    eprintln!("{}", formatter.format_provision_plan(&plan));

    info!("Provisioning catalog: {}", params.workshop.catalog);

    let client = build_statement_client(&params)?;
    let provider = SqlCatalogProvider::new(client);
    let runner = StepRunner::new(&provider)
        .with_step_timeout(params.platform.step_timeout_secs)
        .with_cancel_flag(spawn_cancel_handler());

    let report = runner.run(&plan).await?;
    eprintln!("{}", formatter.format_report(&report));

    Ok(())
}

/// Drop workshop tables, optionally cascading to schema and catalog.
async fn cmd_teardown(
    config_path: Option<&PathBuf>,
    catalog: Option<String>,
    tables: Vec<String>,
    cascade: bool,
    yes: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut params = resolve_params(config_path)?;
    if let Some(catalog) = catalog {
        params.workshop.catalog = catalog;
    }
    if !tables.is_empty() {
        params.workshop.tables = tables;
    }
    ParamsValidator::new().validate(&params)?;

    let plan = ProvisionPlan::teardown(
        &params.workshop.catalog,
        &params.workshop.schema,
        &params.workshop.tables,
        cascade,
    );

    if plan.is_empty() {
        eprintln!("{}", formatter.warning("Nothing to drop."));
        return Ok(());
    }

    eprintln!("{}", formatter.format_provision_plan(&plan));

    // Confirm unless --yes; a cascading drop is irreversible and requires a
    // typed confirmation.
    if !yes {
        if cascade {
            eprint!(
                "This drops catalog '{}' and everything in it. Type 'teardown' to confirm: ",
                params.workshop.catalog
            );
            std::io::stderr().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if input.trim() != "teardown" {
                eprintln!("Teardown cancelled.");
                return Ok(());
            }
        } else {
            eprint!(
                "Drop {} table(s) from '{}'? [y/N]: ",
                params.workshop.tables.len(),
                params.workshop.qualified_schema()
            );
            std::io::stderr().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                eprintln!("Teardown cancelled.");
                return Ok(());
            }
        }
    }

    info!("Tearing down catalog: {}", params.workshop.catalog);

    let client = build_statement_client(&params)?;
    let provider = SqlCatalogProvider::new(client);
    let runner = StepRunner::new(&provider)
        .with_step_timeout(params.platform.step_timeout_secs)
        .with_cancel_flag(spawn_cancel_handler());

    let report = runner.run(&plan).await?;
    eprintln!("{}", formatter.format_report(&report));

    Ok(())
}

/// Plan, render, or push the MCP server template.
async fn cmd_template(
    config_path: Option<&PathBuf>,
    command: TemplateCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let params = resolve_params(config_path)?;
    ParamsValidator::new().validate(&params)?;

    match command {
        TemplateCommands::Plan { dest } => {
            let plan = build_sync_plan(&params, dest).await?;
            eprintln!("{}", formatter.format_sync_plan(&plan));
            Ok(())
        }
        TemplateCommands::Render { dest, file } => {
            let plan = build_sync_plan(&params, dest).await?;
            let script = render_script(&plan, &params.participant.prefix);

            if let Some(path) = file {
                std::fs::write(&path, script)?;
                eprintln!(
                    "{}",
                    formatter.success(&format!("Wrote deployment script: {}", path.display()))
                );
            } else {
                eprintln!("{script}");
            }
            Ok(())
        }
        TemplateCommands::Push { dest, yes } => {
            let plan = build_sync_plan(&params, dest).await?;

            if plan.is_empty() {
                eprintln!(
                    "{}",
                    formatter.warning("No files match the template patterns; nothing to push.")
                );
                return Ok(());
            }

            eprintln!("{}", formatter.format_sync_plan(&plan));

            if !yes {
                eprint!("Upload {} file(s) to '{}'? [y/N]: ", plan.file_count(), plan.dest);
                std::io::stderr().flush()?;

                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    eprintln!("Push cancelled.");
                    return Ok(());
                }
            }

            let credentials = PlatformCredentials::from_env()?;
            let store =
                WorkspaceClient::with_timeout(&credentials, params.platform.request_timeout_secs)?;
            let executor = SyncExecutor::new(&store);

            let report = executor.apply(&plan).await?;
            eprintln!("{}", formatter.format_sync_report(&report));

            Ok(())
        }
    }
}

/// Validate the workshop parameter file.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let params = resolve_params(config_path)?;

    let validator = ParamsValidator::new();
    let result = validator.validate(&params)?;

    eprintln!("{}", formatter.format_validation(&result, show_warnings));

    debug!("Resolved catalog: {}", params.workshop.catalog);
    eprintln!("\nResolved parameters:");
    eprintln!("  Catalog:         {}", params.workshop.catalog);
    eprintln!("  Schema:          {}", params.workshop.qualified_schema());
    eprintln!("  Tables:          {}", params.workshop.tables.join(", "));
    eprintln!("  Participant:     {}", params.participant.prefix);
    eprintln!("  Server name:     {}", params.participant.server_name);
    eprintln!("  Template source: {}", params.template.source);
    eprintln!("  Serve root:      {}", params.serve.root);

    Ok(())
}

/// Serve the workshop frontend directory over HTTP.
async fn cmd_serve(
    config_path: Option<&PathBuf>,
    root: Option<PathBuf>,
    listen: Option<String>,
) -> Result<()> {
    let mut params = resolve_params(config_path)?;
    if let Some(root) = root {
        params.serve.root = root.display().to_string();
    }
    if let Some(listen) = listen {
        params.serve.listen = listen;
    }
    ParamsValidator::new().validate(&params)?;

    let config = ServeConfig::from_section(&params.serve)?;
    serve::serve(&config).await
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves parameters from the optional config file and the environment.
fn resolve_params(config_path: Option<&PathBuf>) -> Result<WorkshopParams> {
    let resolver = config_path
        .and_then(|path| path.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(ParamsResolver::new, |dir| {
            ParamsResolver::new().with_base_path(dir)
        });

    resolver.load_dotenv()?;
    resolver.resolve(config_path.map(PathBuf::as_path))
}

/// Builds the SQL statement client from environment credentials.
fn build_statement_client(params: &WorkshopParams) -> Result<StatementClient> {
    let credentials = PlatformCredentials::from_env()?;
    let client = StatementClient::with_timeout(&credentials, params.platform.request_timeout_secs)?
        .with_poll_timeout(params.platform.step_timeout_secs);
    Ok(client)
}

/// Builds the upload plan for the template directory.
///
/// The destination defaults to the current user's workspace directory for the
/// configured server name, resolved through the workspace API.
async fn build_sync_plan(params: &WorkshopParams, dest: Option<String>) -> Result<SyncPlan> {
    let dest = match dest {
        Some(dest) => dest,
        None => {
            let credentials = PlatformCredentials::from_env()?;
            let store =
                WorkspaceClient::with_timeout(&credentials, params.platform.request_timeout_secs)?;
            let user = store.current_user().await?;
            debug!("Resolved workspace user: {user}");
            format!("/Workspace/Users/{user}/{}", params.participant.server_name)
        }
    };

    SyncPlan::discover(
        Path::new(&params.template.source),
        &dest,
        &params.template.patterns,
    )
}

/// Spawns a Ctrl-C handler that flips the cancellation flag.
///
/// The current step is allowed to finish; the runner stops before starting
/// the next one.
fn spawn_cancel_handler() -> CancelFlag {
    let flag = CancelFlag::new();
    let handler_flag = flag.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received; stopping after the current step.");
            handler_flag.cancel();
        }
    });

    flag
}
