//! pinecone-cleanup: empties and deletes Pinecone projects
//!
//! Mints a short-lived project key, drains indexes, collections and backups
//! with bounded retries, revokes the key and deletes the project.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pinecone_cleanup::api::{
    AdminClient, ApiContext, ControlPlaneClient, Credentials, PineconeProject, ScopedApiKey,
};
use pinecone_cleanup::config::{
    ApiConfig, DEFAULT_ADMIN_URL, DEFAULT_AUTH_URL, DEFAULT_CONTROL_PLANE_URL,
    DEFAULT_MAX_RETRIES, DEFAULT_SLEEP_INTERVAL, EraserConfig, OuterRetryPolicy,
};
use pinecone_cleanup::orchestrator::{
    CleanupError, CleanupPlan, DeleteProjectOptions, EraseReport, delete_project,
    run_ci_cleanup,
};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pinecone-cleanup")]
#[command(about = "Delete every resource in a Pinecone project, then the project")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// REST endpoints
#[derive(clap::Args, Debug)]
struct ApiArgs {
    /// Control plane base URL
    #[arg(long, env = "PINECONE_CONTROLLER_HOST", default_value = DEFAULT_CONTROL_PLANE_URL)]
    controller_host: String,

    /// Admin API base URL
    #[arg(long, env = "PINECONE_ADMIN_HOST", default_value = DEFAULT_ADMIN_URL)]
    admin_host: String,

    /// OAuth token endpoint
    #[arg(long, env = "PINECONE_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    auth_url: String,
}

impl From<ApiArgs> for ApiConfig {
    fn from(args: ApiArgs) -> Self {
        ApiConfig {
            control_plane_url: args.controller_host,
            admin_url: args.admin_host,
            auth_url: args.auth_url,
            ..Default::default()
        }
    }
}

/// Service account and target project
#[derive(clap::Args, Debug)]
struct AccountArgs {
    /// Service account client id
    #[arg(long, env = "PINECONE_SERVICE_ACCOUNT_CLIENT_ID")]
    client_id: String,

    /// Service account client secret
    #[arg(long, env = "PINECONE_SERVICE_ACCOUNT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Project to clean up and delete
    #[arg(long, env = "PROJECT_ID")]
    project_id: String,
}

/// Pacing and per-resource retry budgets
#[derive(clap::Args, Debug)]
struct EraserArgs {
    /// Pause before each resource is processed, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SLEEP_INTERVAL.as_millis() as u64)]
    sleep_interval_ms: u64,

    /// Attempts per resource before giving up (terminating resources get three times this)
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
}

impl From<EraserArgs> for EraserConfig {
    fn from(args: EraserArgs) -> Self {
        EraserConfig {
            sleep_interval: Duration::from_millis(args.sleep_interval_ms),
            max_retries: args.max_retries,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Force-delete all indexes, collections and backups, then delete the project
    Cleanup {
        #[command(flatten)]
        account: AccountArgs,

        #[command(flatten)]
        api: ApiArgs,

        #[command(flatten)]
        eraser: EraserArgs,

        /// Report format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Delete a project, optionally emptying it first
    DeleteProject {
        #[command(flatten)]
        account: AccountArgs,

        #[command(flatten)]
        api: ApiArgs,

        #[command(flatten)]
        eraser: EraserArgs,

        /// Delete all indexes first
        #[arg(long)]
        delete_indexes: bool,

        /// Delete all collections first
        #[arg(long)]
        delete_collections: bool,

        /// Delete all backups first
        #[arg(long)]
        delete_backups: bool,

        /// Turn off deletion protection on protected indexes
        #[arg(long)]
        force: bool,

        /// Report format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List the project's indexes, collections and backups without changing anything
    Scan {
        /// Project API key
        #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
        api_key: String,

        #[command(flatten)]
        api: ApiArgs,

        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    // Print main error message
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    // Print error chain (causes)
    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    // Only print backtrace hint if not already showing
    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        // Print backtrace if available and requested
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match args.command {
        Command::Cleanup {
            account,
            api,
            eraser,
            format,
        } => handle_cleanup(account, api.into(), eraser.into(), format).await,

        Command::DeleteProject {
            account,
            api,
            eraser,
            delete_indexes,
            delete_collections,
            delete_backups,
            force,
            format,
        } => {
            let options = DeleteProjectOptions {
                plan: CleanupPlan {
                    indexes: delete_indexes,
                    collections: delete_collections,
                    backups: delete_backups,
                    force,
                },
                eraser: eraser.into(),
                policy: OuterRetryPolicy::library(),
            };
            handle_delete_project(account, api.into(), options, format).await
        }

        Command::Scan {
            api_key,
            api,
            format,
        } => handle_scan(api_key, api.into(), format).await,
    }
}

async fn login(account: &AccountArgs, config: ApiConfig) -> Result<AdminClient> {
    AdminClient::login(config, &account.client_id, &account.client_secret)
        .await
        .context("Failed to authenticate service account")
}

/// Build a project handle from a scoped key, sharing the admin client's HTTP pool
fn connect(
    admin: &AdminClient,
) -> impl FnOnce(&ScopedApiKey) -> Result<PineconeProject, pinecone_cleanup::api::ApiError> + '_ {
    move |key| {
        let ctx = admin
            .context()
            .with_credentials(Credentials::ApiKey(key.value.clone()));
        Ok(PineconeProject::new(ControlPlaneClient::from_context(&ctx)))
    }
}

/// Handle the cleanup command
async fn handle_cleanup(
    account: AccountArgs,
    config: ApiConfig,
    eraser: EraserConfig,
    format: OutputFormat,
) -> Result<()> {
    info!(project_id = %account.project_id, "Cleaning up project");

    let admin = login(&account, config).await?;
    let result = run_ci_cleanup(&admin, &account.project_id, eraser, connect(&admin)).await;
    report_result(result, format)
}

/// Handle the delete-project command
async fn handle_delete_project(
    account: AccountArgs,
    config: ApiConfig,
    options: DeleteProjectOptions,
    format: OutputFormat,
) -> Result<()> {
    info!(
        project_id = %account.project_id,
        kinds = ?options.plan.kinds(),
        force = options.plan.force,
        "Deleting project"
    );

    let admin = login(&account, config).await?;
    let result = delete_project(&admin, &account.project_id, &options, connect(&admin)).await;
    report_result(result, format)
}

fn report_result(result: Result<EraseReport, CleanupError>, format: OutputFormat) -> Result<()> {
    let report = match &result {
        Ok(report) => Some(report),
        Err(e) => e.report(),
    };
    if let Some(report) = report {
        print_report(report, format)?;
    }
    result.map(|_| ()).map_err(Into::into)
}

/// Print the final attempt's failures
fn print_report(report: &EraseReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.failures.is_empty() {
        println!(
            "No undeletable resources after {} attempt(s); {} deleted.",
            report.attempts,
            report.deleted()
        );
        return Ok(());
    }

    println!("{:<12} {:<40} {:<30} DETAIL", "TYPE", "NAME", "REASON");
    println!("{}", "-".repeat(100));
    for f in &report.failures {
        println!(
            "{:<12} {:<40} {:<30} {}",
            f.resource_type.label(),
            truncate(&f.resource_name, 39),
            f.reason.to_string(),
            f.detail
        );
    }
    println!(
        "\nTotal: {} undeletable resources after {} attempt(s)",
        report.failures.len(),
        report.attempts
    );
    Ok(())
}

/// One scanned resource
#[derive(serde::Serialize)]
struct ScanRow {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
    state: String,
    protected: bool,
    created_at: Option<String>,
}

/// Handle the scan command
async fn handle_scan(api_key: String, config: ApiConfig, format: OutputFormat) -> Result<()> {
    info!(host = %config.control_plane_url, "Scanning project resources");

    let ctx = ApiContext::new(config, Credentials::ApiKey(api_key))?;
    let client = ControlPlaneClient::from_context(&ctx);

    let indexes = client.list_indexes().await.context("Failed to list indexes")?;
    let collections = client
        .list_collections()
        .await
        .context("Failed to list collections")?;
    let backups = client.list_backups().await.context("Failed to list backups")?;

    let mut rows: Vec<ScanRow> = Vec::new();
    rows.extend(indexes.into_iter().map(|i| ScanRow {
        kind: "index",
        state: i.state().to_string(),
        protected: i.deletion_protection.is_enabled(),
        name: i.name,
        created_at: None,
    }));
    rows.extend(collections.into_iter().map(|c| ScanRow {
        kind: "collection",
        state: c.state().to_string(),
        protected: false,
        name: c.name,
        created_at: None,
    }));
    rows.extend(backups.into_iter().map(|b| ScanRow {
        kind: "backup",
        state: b.state().to_string(),
        protected: false,
        created_at: b
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        name: b.backup_id,
    }));

    if rows.is_empty() {
        println!("No resources found in project.");
        return Ok(());
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!(
            "{:<12} {:<40} {:<22} {:<10} {:<20}",
            "TYPE", "NAME", "STATE", "PROTECTED", "CREATED_AT"
        );
        println!("{}", "-".repeat(106));
        for r in &rows {
            println!(
                "{:<12} {:<40} {:<22} {:<10} {:<20}",
                r.kind,
                truncate(&r.name, 39),
                r.state,
                if r.protected { "yes" } else { "no" },
                r.created_at.as_deref().unwrap_or("-"),
            );
        }
        println!("\nTotal: {} resources", rows.len());
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
