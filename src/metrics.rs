use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up in the exposition).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_messages_total", "Messages offered to the pipeline.");
        describe_counter!("ingest_valid_total", "Messages that passed validation.");
        describe_counter!("ingest_invalid_total", "Messages rejected as noise.");
        describe_counter!(
            "ingest_mentions_total",
            "Ticker mentions extracted from valid messages."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Message source fetch failures."
        );
        describe_counter!(
            "ingest_source_malformed_total",
            "Source lines that did not decode as a message."
        );
        describe_counter!("merge_applied_total", "Ticker merges written to the store.");
        describe_counter!(
            "merge_failed_total",
            "Ticker merges aborted (tier, scoring or store error)."
        );
        describe_gauge!("tickers_tracked", "Distinct tickers currently in the store.");
    });
}

/// Install the global Prometheus recorder. Call once from the binary.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    ensure_described();
    Ok(handle)
}
