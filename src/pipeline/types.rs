//! Shared types for the digest pipeline.

use serde::Deserialize;
use url::Url;

use crate::render::strip_html;

/// Maximum length (in characters) of an item's summary.
pub const SUMMARY_MAX_CHARS: usize = 280;

// ── Sources ─────────────────────────────────────────────────────────

/// A named, URL-addressed content source from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Feed {
    pub name: String,
    pub url: String,
}

impl Feed {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One entry as parsed from a feed, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Raw summary, possibly containing markup.
    pub summary: Option<String>,
}

// ── Items ───────────────────────────────────────────────────────────

/// A candidate article with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub source: String,
    pub title: String,
    pub link: Url,
    /// Plain text, at most [`SUMMARY_MAX_CHARS`] characters.
    pub summary: String,
    pub score: i32,
}

impl Item {
    /// Build an item from a feed entry. Markup is stripped from the summary
    /// and the result truncated. Returns `None` when the entry has no usable
    /// link.
    pub fn from_entry(source: &str, entry: &FeedEntry) -> Option<Self> {
        let link = entry.link.as_deref()?.trim();
        let link = Url::parse(link).ok()?;

        let title = entry
            .title
            .as_deref()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "(untitled)".to_string());

        let summary = entry.summary.as_deref().map(strip_html).unwrap_or_default();

        Some(Self {
            source: source.to_string(),
            title,
            link,
            summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
            score: 0,
        })
    }
}

/// Truncate to at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ── Prepared content ────────────────────────────────────────────────

/// Subject/preheader overrides from the prepared metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigestMeta {
    pub subject: Option<String>,
    pub preheader: Option<String>,
}

/// Manually authored content for one date. Every part is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedContent {
    pub html: Option<String>,
    pub text: Option<String>,
    pub meta: DigestMeta,
}

/// Which tier supplies the digest body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A prepared HTML fragment, used verbatim.
    Prepared(String),
    /// Rank, summarize, or fall back.
    NeedsGeneration,
}

/// The single decision point for the prepared tier.
pub fn content_source(prepared: &PreparedContent) -> ContentSource {
    match &prepared.html {
        Some(html) => ContentSource::Prepared(html.clone()),
        None => ContentSource::NeedsGeneration,
    }
}

/// Which tier produced a digest, recorded in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    Prepared,
    Generated,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepared => "Prepared",
            Self::Generated => "Generated",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Digest ──────────────────────────────────────────────────────────

/// The finished artifact of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub preheader: String,
    /// The content fragment supplied by exactly one tier.
    pub html_inner: String,
    /// Full rendered page around `html_inner`.
    pub html: String,
    /// Derived from `html`.
    pub plain_text: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Resolver output: the digest plus the tier that produced it.
#[derive(Debug, Clone)]
pub struct ResolvedDigest {
    pub digest: Digest,
    pub source_tag: SourceTag,
}

impl ResolvedDigest {
    pub fn archive_record(&self) -> ArchiveRecord<'_> {
        ArchiveRecord {
            subject: &self.digest.subject,
            preheader: &self.digest.preheader,
            date: &self.digest.date,
            html_inner: &self.digest.html_inner,
            plain_text: &self.digest.plain_text,
            source_tag: self.source_tag,
        }
    }
}

/// View of a digest as written to the archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRecord<'a> {
    pub subject: &'a str,
    pub preheader: &'a str,
    pub date: &'a str,
    pub html_inner: &'a str,
    pub plain_text: &'a str,
    pub source_tag: SourceTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, link: &str, summary: &str) -> FeedEntry {
        FeedEntry {
            title: Some(title.into()),
            link: Some(link.into()),
            summary: Some(summary.into()),
        }
    }

    #[test]
    fn item_strips_markup_from_summary() {
        let item = Item::from_entry(
            "ExampleBlog",
            &entry("Title", "https://example.com/a", "<p>Hello <b>world</b></p>"),
        )
        .unwrap();
        assert_eq!(item.summary, "Hello world");
        assert_eq!(item.source, "ExampleBlog");
        assert_eq!(item.score, 0);
    }

    #[test]
    fn item_title_keeps_literal_angle_brackets() {
        let item = Item::from_entry(
            "ExampleBlog",
            &entry("Why <dialog>\n  matters", "https://example.com/a", ""),
        )
        .unwrap();
        assert_eq!(item.title, "Why <dialog> matters");
    }

    #[test]
    fn item_summary_is_truncated_to_280_chars() {
        let long = "ž".repeat(400);
        let item =
            Item::from_entry("S", &entry("T", "https://example.com/a", &long)).unwrap();
        assert_eq!(item.summary.chars().count(), SUMMARY_MAX_CHARS);
    }

    #[test]
    fn item_without_link_is_dropped() {
        let mut e = entry("T", "", "s");
        e.link = None;
        assert!(Item::from_entry("S", &e).is_none());
        assert!(Item::from_entry("S", &entry("T", "not a url", "s")).is_none());
    }

    #[test]
    fn item_without_title_gets_placeholder() {
        let mut e = entry("", "https://example.com/a", "s");
        assert_eq!(Item::from_entry("S", &e).unwrap().title, "(untitled)");
        e.title = None;
        assert_eq!(Item::from_entry("S", &e).unwrap().title, "(untitled)");
    }

    #[test]
    fn truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn content_source_prefers_prepared_html() {
        let prepared = PreparedContent {
            html: Some("<p>hand written</p>".into()),
            ..Default::default()
        };
        assert_eq!(
            content_source(&prepared),
            ContentSource::Prepared("<p>hand written</p>".into())
        );
        assert_eq!(
            content_source(&PreparedContent::default()),
            ContentSource::NeedsGeneration
        );
    }

    #[test]
    fn meta_fields_are_independently_optional() {
        let meta: DigestMeta = serde_json::from_str(r#"{"subject": "X"}"#).unwrap();
        assert_eq!(meta.subject.as_deref(), Some("X"));
        assert!(meta.preheader.is_none());

        let meta: DigestMeta = serde_json::from_str(r#"{"preheader": "P", "extra": 1}"#).unwrap();
        assert!(meta.subject.is_none());
        assert_eq!(meta.preheader.as_deref(), Some("P"));
    }

    #[test]
    fn source_tag_labels() {
        assert_eq!(SourceTag::Prepared.to_string(), "Prepared");
        assert_eq!(SourceTag::Generated.as_str(), "Generated");
    }
}
