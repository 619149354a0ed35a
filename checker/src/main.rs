mod checker_config;
mod classify;
mod dashboard;
mod dispatch;
mod error;
mod grouper;
mod rate_limiter;
mod registry;
mod verdict;
mod writer;

use std::env;

use lib_table::{JsonlSummary, JsonlTable, TableStore};
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checker_config::CheckerConfig;
use classify::{ClarifaiClient, ClassifyImages};
use dispatch::{BatchDispatcher, RunStats};
use error::AppResult;
use rate_limiter::RequestPacer;
use registry::ModelRegistry;
use writer::ResultWriter;

pub type HttpClient = reqwest::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    let cfg = CheckerConfig::load()?;
    let registry = ModelRegistry::from_entries(&cfg.models)?;
    tracing::info!("Loaded {} model mappings", registry.len());

    let check_only = env::var("CHECK_ONLY").is_ok_and(|v| v == "true");
    let dashboard_only = env::var("DASHBOARD_ONLY").is_ok_and(|v| v == "true");

    let mut table = JsonlTable::open(&cfg.sheet.rows_path)?;
    tracing::info!(
        "Opened row sheet {} ({} rows)",
        cfg.sheet.rows_path.display(),
        table.len()
    );

    if !dashboard_only {
        let http_client = reqwest::ClientBuilder::new().use_rustls_tls().build()?;
        let client = ClarifaiClient::new(http_client, cfg.api.clone());
        let pacer = RequestPacer::new(Duration::from_millis(cfg.api.batch_interval_ms));

        let stats = run_compliance_check(&mut table, &registry, &client, pacer).await?;
        tracing::info!(
            "Compliance check done: {} rows classified",
            stats.rows_classified
        );
    }

    if !check_only {
        let rows = table.read_rows()?;
        let summary = dashboard::summarize(&rows);
        let mut sink = JsonlSummary::new(&cfg.sheet.summary_path);
        dashboard::render_to(&mut sink, &summary)?;
    }

    Ok(())
}

/// Group the pending rows and dispatch them chunk by chunk; returns the run
/// counters. Unknown-category rows are written during grouping, before any
/// remote call goes out.
async fn run_compliance_check<S: TableStore, C: ClassifyImages>(
    table: &mut S,
    registry: &ModelRegistry,
    client: &C,
    pacer: RequestPacer,
) -> AppResult<RunStats> {
    let rows = table.read_rows()?;
    let mut writer = ResultWriter::new(table);

    let groups = grouper::group_rows(&rows, registry, &mut writer)?;
    tracing::info!(
        "{} model groups to dispatch, {} rows marked during grouping",
        groups.len(),
        writer.rows_written()
    );

    let dispatcher = BatchDispatcher::new(client, pacer);
    dispatcher.run(&groups, &mut writer).await
}
