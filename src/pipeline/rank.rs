//! Ranker: collects candidate items from every feed and orders them by
//! keyword relevance.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::pipeline::types::{Feed, Item};
use crate::sources::FeedFetcher;

/// Entries taken from the top of each feed.
pub const ENTRIES_PER_FEED: usize = 5;

/// Default number of items kept after ranking.
pub const DEFAULT_LIMIT_TOTAL: usize = 12;

/// Points for each area keyword found in an item.
const KEYWORD_POINTS: i32 = 2;

/// Bonus for items from an authoritative publisher.
const AUTHORITY_POINTS: i32 = 1;

/// Publishers whose items get the authority bonus.
pub const DEFAULT_SOURCE_ALLOWLIST: &[&str] = &[
    "W3C/WCAG",
    "Figma Blog",
    "Material Design",
    "Apple HIG",
    "Nielsen Norman Group",
];

/// Scores and orders feed items.
pub struct Ranker {
    fetcher: Arc<dyn FeedFetcher>,
    source_allowlist: Vec<String>,
    limit_total: usize,
}

impl Ranker {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            fetcher,
            source_allowlist: DEFAULT_SOURCE_ALLOWLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            limit_total: DEFAULT_LIMIT_TOTAL,
        }
    }

    pub fn with_limit(mut self, limit_total: usize) -> Self {
        self.limit_total = limit_total;
        self
    }

    /// Fetch every feed in order and return the top items.
    ///
    /// A feed that fails to fetch is logged and skipped.
    pub async fn rank(&self, feeds: &[Feed], areas: &[String]) -> Vec<Item> {
        let mut items = Vec::new();

        for feed in feeds {
            match self.fetcher.fetch(feed).await {
                Ok(entries) => {
                    let before = items.len();
                    items.extend(
                        entries
                            .iter()
                            .take(ENTRIES_PER_FEED)
                            .filter_map(|entry| Item::from_entry(&feed.name, entry)),
                    );
                    debug!(feed = %feed.name, items = items.len() - before, "Collected items");
                }
                Err(e) => {
                    warn!(feed = %feed.name, error = %e, "Skipping feed");
                }
            }
        }

        let ranked = rank_items(items, areas, &self.source_allowlist, self.limit_total);
        info!(
            feeds = feeds.len(),
            items = ranked.len(),
            top_score = ranked.first().map(|i| i.score),
            "Ranked items"
        );
        ranked
    }
}

/// Score, stable-sort (highest first) and truncate already collected items.
pub fn rank_items(
    mut items: Vec<Item>,
    areas: &[String],
    source_allowlist: &[String],
    limit_total: usize,
) -> Vec<Item> {
    for item in &mut items {
        item.score = score(item, areas, source_allowlist);
    }
    // `sort_by` is stable: ties keep fetch order.
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items.truncate(limit_total);
    items
}

/// +2 per area keyword found in title or summary, +1 for allowlisted sources.
pub fn score(item: &Item, areas: &[String], source_allowlist: &[String]) -> i32 {
    let haystack = format!("{} {}", item.title, item.summary).to_lowercase();

    let mut total = 0;
    for area in areas {
        let needle = area.trim().to_lowercase();
        if !needle.is_empty() && haystack.contains(&needle) {
            total += KEYWORD_POINTS;
        }
    }
    if source_allowlist.iter().any(|s| s == &item.source) {
        total += AUTHORITY_POINTS;
    }
    total
}
