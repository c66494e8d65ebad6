//! Feed retrieval: HTTP fetch plus RSS/Atom parsing.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SourceFetchError;
use crate::pipeline::types::{Feed, FeedEntry};

/// Retrieves the entries of one feed, in feed order.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, feed: &Feed) -> Result<Vec<FeedEntry>, SourceFetchError>;
}

/// Fetches feeds over HTTP.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, feed: &Feed) -> Result<Vec<FeedEntry>, SourceFetchError> {
        let response = self
            .client
            .get(&feed.url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, concat!("daily-digest/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| SourceFetchError::Http {
                feed: feed.name.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                feed: feed.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceFetchError::Http {
            feed: feed.name.clone(),
            reason: e.to_string(),
        })?;

        let entries = parse_feed(&feed.name, &body)?;
        debug!(feed = %feed.name, entries = entries.len(), "Fetched feed");
        Ok(entries)
    }
}

/// Parse an RSS or Atom document into raw entries.
pub fn parse_feed(feed_name: &str, body: &[u8]) -> Result<Vec<FeedEntry>, SourceFetchError> {
    let parsed = feed_rs::parser::parse(body).map_err(|e| SourceFetchError::Parse {
        feed: feed_name.to_string(),
        reason: e.to_string(),
    })?;

    Ok(parsed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry.title.map(|t| t.content),
            link: primary_link(entry.links),
            summary: entry.summary.map(|s| s.content),
        })
        .collect())
}

/// The entry's article link: the first `alternate` (or untyped) link, else
/// whatever comes first.
fn primary_link(links: Vec<feed_rs::model::Link>) -> Option<String> {
    let idx = links
        .iter()
        .position(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .unwrap_or(0);
    links.into_iter().nth(idx).map(|l| l.href)
}
