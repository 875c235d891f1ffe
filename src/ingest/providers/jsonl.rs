use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use std::path::Path;

use crate::ingest::types::MessageSource;
use crate::ticker::Message;

/// Newline-delimited JSON messages, one `Message` object per line:
///
/// `{"author":"ansem • X","text":"$WIF ...","timestamp":"2025-06-01T12:00:00Z","link":null}`
///
/// Blank lines are ignored; malformed lines are skipped and counted.
pub struct JsonlSource {
    name: String,
    body: String,
}

impl JsonlSource {
    pub fn from_fixture_str(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            body: body.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading messages from {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            body,
        })
    }

    pub async fn from_stdin() -> Result<Self> {
        use tokio::io::AsyncReadExt;
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("reading messages from stdin")?;
        Ok(Self {
            name: "stdin".to_string(),
            body,
        })
    }

    fn parse_lines(&self) -> Vec<Message> {
        let mut out = Vec::new();
        for (lineno, line) in self.body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Message>(line) {
                Ok(m) => out.push(m),
                Err(e) => {
                    tracing::warn!(
                        target: "ingest",
                        source = %self.name,
                        line = lineno + 1,
                        error = %e,
                        "skipping malformed message line"
                    );
                    counter!("ingest_source_malformed_total").increment(1);
                }
            }
        }
        out
    }
}

#[async_trait]
impl MessageSource for JsonlSource {
    async fn fetch_latest(&self) -> Result<Vec<Message>> {
        Ok(self.parse_lines())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
