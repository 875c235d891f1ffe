//! Mindshare tracker: binary entrypoint
//! Loads config + tier table, restores the ticker snapshot, ingests JSONL
//! messages (one task per input file), saves the snapshot and prints the
//! discovery views as JSON on stdout.
//!
//! Env:
//!   MESSAGES_PATH      comma-separated JSONL files (default: stdin)
//!   TICKER_STATE_PATH  snapshot file (default: state/tickers.json)
//!   DISCOVERY_SORT     score | symbol | recency (default: score)
//!   DISCOVERY_DIR      asc | desc (default: desc)
//!   METRICS_DUMP=1     print Prometheus exposition to stderr at exit
//!   LOG_FORMAT=json    JSON log lines instead of compact text

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mindshare_tracker::config::{AppConfig, TierTable};
use mindshare_tracker::discovery::{DiscoveryViews, SortDirection, SortKey};
use mindshare_tracker::ingest::{
    self, providers::jsonl::JsonlSource, types::MessageSource, IngestSession, SessionSummary,
};
use mindshare_tracker::store::InMemoryTickerStore;

const DEFAULT_STATE_PATH: &str = "state/tickers.json";

/// Logs go to stderr; stdout carries the JSON report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ingest=info,store=info,config=info,aggregate=warn,warn")
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn env_parse<T: std::str::FromStr<Err = String>>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.parse::<T>().map_err(|e| anyhow::anyhow!("{key}: {e}")),
        _ => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics_handle = if std::env::var("METRICS_DUMP").ok().as_deref() == Some("1") {
        Some(mindshare_tracker::metrics::install_prometheus()?)
    } else {
        None
    };

    let cfg = AppConfig::load_default().context("loading mindshare config")?;
    let tiers = TierTable::load_default().context("loading contributor tiers")?;
    info!(
        target: "config",
        contributors = tiers.len(),
        scale = ?cfg.scoring.category_scale,
        "config loaded"
    );

    let state_path = std::env::var("TICKER_STATE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH));
    let store = if state_path.exists() {
        InMemoryTickerStore::load_json(&state_path).context("restoring ticker snapshot")?
    } else {
        InMemoryTickerStore::new()
    };
    let store = Arc::new(store);
    let aggregator = mindshare_tracker::build_aggregator(&cfg, tiers, Arc::clone(&store));

    // One producer task per input, each with its own session counters.
    let mut sources: Vec<Box<dyn MessageSource>> = Vec::new();
    match std::env::var("MESSAGES_PATH") {
        Ok(paths) if !paths.trim().is_empty() => {
            for p in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                sources.push(Box::new(JsonlSource::from_path(&PathBuf::from(p))?));
            }
        }
        _ => sources.push(Box::new(JsonlSource::from_stdin().await?)),
    }

    let mut tasks = Vec::with_capacity(sources.len());
    for src in sources {
        let mut session = IngestSession::new(&cfg.validator, aggregator.clone());
        tasks.push(tokio::spawn(async move {
            let one = [src];
            ingest::run_once(&one, &mut session).await
        }));
    }
    let mut summary = SessionSummary::default();
    for t in tasks {
        let s = t.await.context("ingest task failed")?;
        summary = summary.combine(&s);
    }

    store.save_json(&state_path).context("saving ticker snapshot")?;

    let now = Utc::now();
    let sort = env_parse("DISCOVERY_SORT", SortKey::Score)?;
    let direction = env_parse("DISCOVERY_DIR", SortDirection::Desc)?;
    let views = DiscoveryViews::new(store.as_ref(), &cfg.discovery);

    let report = serde_json::json!({
        "summary": summary,
        "fresh": views.fresh(now)?,
        "momentum": views.momentum(now)?,
        "revived": views.revived(now)?,
        "discovery": views.generic_default(now, sort, direction)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(h) = metrics_handle {
        eprintln!("{}", h.render());
    }
    Ok(())
}
