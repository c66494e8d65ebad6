//! Notion archival of each digest as a database page.
//!
//! Archival is best effort: every failure is logged and reported as
//! [`ArchiveOutcome::Failed`], and the run carries on to delivery.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::ArchiveConfig;
use crate::error::ArchiveError;
use crate::pipeline::types::{ArchiveRecord, truncate_chars};

const NOTION_API: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Notion caps a single rich text object at 2000 characters.
const RICH_TEXT_MAX_CHARS: usize = 2000;
const PREHEADER_MAX_CHARS: usize = 200;
/// Characters of an error body kept in the log.
const ERROR_BODY_CHARS: usize = 200;

/// What happened to the archive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// No credentials configured.
    Skipped,
    Archived { status: u16 },
    Failed(String),
}

/// Writes digests to a Notion database.
pub struct Archiver {
    config: Option<ArchiveConfig>,
    client: reqwest::Client,
    base_url: String,
}

impl Archiver {
    pub fn new(config: Option<ArchiveConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            base_url: NOTION_API.to_string(),
        }
    }

    /// Point the archiver at another API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn archive(&self, record: &ArchiveRecord<'_>) -> ArchiveOutcome {
        let Some(config) = &self.config else {
            debug!("Notion archival not configured, skipping");
            return ArchiveOutcome::Skipped;
        };

        match self.create_page(config, record).await {
            Ok(status) => {
                info!(status, date = record.date, source = %record.source_tag, "Archived digest to Notion");
                ArchiveOutcome::Archived { status }
            }
            Err(e) => {
                warn!(error = %e, "Notion archival failed");
                ArchiveOutcome::Failed(e.to_string())
            }
        }
    }

    async fn create_page(
        &self,
        config: &ArchiveConfig,
        record: &ArchiveRecord<'_>,
    ) -> Result<u16, ArchiveError> {
        let payload = build_payload(record, &config.database_id);

        let response = self
            .client
            .post(format!("{}/v1/pages", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(config.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchiveError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_CHARS),
            });
        }
        Ok(status.as_u16())
    }
}

/// The page-creation body for one digest.
pub fn build_payload(record: &ArchiveRecord<'_>, database_id: &str) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Subject": {
                "title": [text(&truncate_chars(record.subject, RICH_TEXT_MAX_CHARS))]
            },
            "Preheader": {
                "rich_text": [text(&truncate_chars(record.preheader, PREHEADER_MAX_CHARS))]
            },
            "Date": { "date": { "start": record.date } },
            "Source": { "select": { "name": record.source_tag.as_str() } },
        },
        "children": [
            paragraph("HTML:"),
            code_block("html", record.html_inner),
            paragraph("Plain text:"),
            code_block("plain text", record.plain_text),
        ],
    })
}

fn text(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn paragraph(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": [text(content)] },
    })
}

fn code_block(language: &str, content: &str) -> Value {
    let rich_text: Vec<Value> = chunk_chars(content, RICH_TEXT_MAX_CHARS)
        .iter()
        .map(|chunk| text(chunk))
        .collect();
    json!({
        "object": "block",
        "type": "code",
        "code": { "language": language, "rich_text": rich_text },
    })
}

/// Split into pieces of at most `max` characters. Empty input yields one
/// empty piece.
fn chunk_chars(content: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}
