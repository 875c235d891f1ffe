// src/ingest/types.rs
use anyhow::Result;

use crate::ticker::Message;

/// Producer seam: anything that can hand over a batch of collected messages
/// (chat export, social collector, fixture file).
#[async_trait::async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Message>>;
    fn name(&self) -> &str;
}
