//! Content sources: the feed catalog and per-feed retrieval.

pub mod catalog;
pub mod feed;

pub use catalog::SourceCatalog;
pub use feed::{FeedFetcher, HttpFeedFetcher, parse_feed};
