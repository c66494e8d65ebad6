//! Content resolver: picks the tier that supplies the digest body and
//! assembles the finished digest.
//!
//! Tiers, first match wins:
//! 1. Prepared HTML for the run date, used verbatim.
//! 2. LLM summary of the ranked items.
//! 3. Deterministic fallback list of the top items.
//!
//! Subject and preheader come from the templates and are then overridden by
//! prepared metadata, whichever tier supplied the body.

use tracing::info;

use crate::clock::RunClock;
use crate::config::DigestTemplates;
use crate::error::ConfigError;
use crate::pipeline::prepared::PreparedStore;
use crate::pipeline::rank::Ranker;
use crate::pipeline::summarizer::{Summarizer, Summary};
use crate::pipeline::types::{
    ContentSource, Digest, DigestMeta, Item, ResolvedDigest, SourceTag, content_source,
};
use crate::render::{Renderer, escape_html};
use crate::sources::SourceCatalog;

/// Items listed in the fallback fragment.
pub const FALLBACK_ITEMS: usize = 6;

/// Chooses the content tier and builds the digest.
pub struct ContentResolver {
    prepared: PreparedStore,
    catalog: SourceCatalog,
    ranker: Ranker,
    summarizer: Summarizer,
    renderer: Renderer,
    templates: DigestTemplates,
    areas: Vec<String>,
}

impl ContentResolver {
    pub fn new(
        prepared: PreparedStore,
        catalog: SourceCatalog,
        ranker: Ranker,
        summarizer: Summarizer,
        templates: DigestTemplates,
        areas: Vec<String>,
    ) -> Self {
        Self {
            prepared,
            catalog,
            ranker,
            summarizer,
            renderer: Renderer::default(),
            templates,
            areas,
        }
    }

    /// Resolve the digest for the clock's date.
    ///
    /// The catalog is only read when no prepared HTML exists.
    pub async fn resolve(&self, clock: &RunClock) -> Result<ResolvedDigest, ConfigError> {
        let date_key = clock.date_key();
        let date_human = clock.date_human();
        let prepared = self.prepared.load(&date_key)?;

        let (html_inner, source_tag) = match content_source(&prepared) {
            ContentSource::Prepared(fragment) => {
                info!(date = %date_key, "Using prepared content");
                (fragment, SourceTag::Prepared)
            }
            ContentSource::NeedsGeneration => {
                (self.generate(&date_human).await?, SourceTag::Generated)
            }
        };

        let (subject, preheader) = headline(&self.templates, &prepared.meta, &date_human);
        let rendered = self.renderer.render(&html_inner, &preheader, &date_human);

        Ok(ResolvedDigest {
            digest: Digest {
                subject,
                preheader,
                html_inner,
                html: rendered.html,
                plain_text: rendered.plain_text,
                date: date_key,
            },
            source_tag,
        })
    }

    async fn generate(&self, date_human: &str) -> Result<String, ConfigError> {
        let feeds = self.catalog.load()?;
        let items = self.ranker.rank(&feeds, &self.areas).await;

        match self.summarizer.summarize(&items).await {
            Summary::Available(fragment) => Ok(fragment),
            Summary::Unavailable(reason) => {
                info!(?reason, items = items.len(), "Summary unavailable, using fallback list");
                Ok(fallback_fragment(&items, date_human))
            }
        }
    }
}

/// Default subject/preheader with metadata overrides applied.
pub fn headline(templates: &DigestTemplates, meta: &DigestMeta, date_human: &str) -> (String, String) {
    let subject = meta
        .subject
        .clone()
        .unwrap_or_else(|| templates.render_subject(date_human));
    let preheader = meta
        .preheader
        .clone()
        .unwrap_or_else(|| templates.preheader.clone());
    (subject, preheader)
}

/// Deterministic list of the top [`FALLBACK_ITEMS`] items.
pub fn fallback_fragment(items: &[Item], date_human: &str) -> String {
    let entries: String = items
        .iter()
        .take(FALLBACK_ITEMS)
        .map(|item| {
            format!(
                "<li><strong><a href='{}'>{}</a></strong> — <em>{}</em></li>",
                escape_html(item.link.as_str()),
                escape_html(&item.title),
                escape_html(&item.source),
            )
        })
        .collect();

    format!(
        "<h1>UX Daily · {}</h1><h2>Denní UX přehled</h2><ul>{entries}</ul>",
        escape_html(date_human)
    )
}
