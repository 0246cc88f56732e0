//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use comfy_table::Table;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::gitlab::GitLabClient;
use crate::adapters::postgres;
use crate::domain::models::{LoggingConfig, RefreshMode};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{LoadOrchestrator, RunSummary};

#[derive(Parser, Debug)]
#[command(
    name = "issuestar",
    version,
    about = "Extract GitLab issue data into a PostgreSQL star-schema warehouse"
)]
pub struct Cli {
    /// Path to a YAML config file (defaults to issuestar.yaml plus
    /// ISSUESTAR_* environment variables)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured refresh mode for this run
    #[arg(long, value_enum)]
    pub refresh: Option<RefreshModeArg>,
}

/// CLI mirror of [`RefreshMode`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RefreshModeArg {
    /// Truncate the warehouse and rebuild it from scratch
    FullRefresh,
    /// Keep existing rows; refresh dimensions and rewrite facts per issue
    Incremental,
}

impl From<RefreshModeArg> for RefreshMode {
    fn from(arg: RefreshModeArg) -> Self {
        match arg {
            RefreshModeArg::FullRefresh => RefreshMode::FullRefresh,
            RefreshModeArg::Incremental => RefreshMode::Incremental,
        }
    }
}

/// Load config, connect to both stores, and drive the run.
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(mode) = cli.refresh {
        config.run.refresh = mode.into();
    }

    init_tracing(&config.logging);

    let tracker = GitLabClient::new(&config.gitlab, &config.http)
        .context("failed to build GitLab client")?;
    tracker
        .verify_connection()
        .await
        .context("GitLab connection check failed")?;
    info!(base_url = %config.gitlab.base_url, "connected to GitLab");

    let pool = postgres::create_pool(&config.warehouse)
        .await
        .context("failed to create warehouse pool")?;
    postgres::verify_connection(&pool)
        .await
        .context("warehouse connection check failed")?;
    info!(schema = %config.warehouse.schema, "connected to warehouse");

    let orchestrator = LoadOrchestrator::new(&tracker, &pool, &config);
    let summary = orchestrator.run().await?;

    println!("{}", summary_table(&summary));
    info!(
        projects = summary.projects,
        issues = summary.issues,
        "run completed"
    );

    pool.close().await;
    Ok(())
}

/// Initialize the global subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["metric", "count"]);
    table.add_row(vec!["projects loaded".to_string(), summary.projects.to_string()]);
    table.add_row(vec!["issues loaded".to_string(), summary.issues.to_string()]);
    table.add_row(vec![
        "date enrichment failures".to_string(),
        summary.date_enrichment_failures.to_string(),
    ]);
    table.add_row(vec![
        "comment lookup failures".to_string(),
        summary.comment_lookup_failures.to_string(),
    ]);
    table
}
