//! Digest pipeline.
//!
//! One run flows through:
//! 1. `ContentResolver::resolve()`: prepared content, LLM summary or fallback
//! 2. `Archiver::archive()`: best effort, never blocks delivery
//! 3. `Dispatcher::dispatch()`: one multipart message to all recipients
//!
//! Configuration and delivery failures abort the run; everything else
//! degrades to the next tier.

pub mod prepared;
pub mod rank;
pub mod resolver;
pub mod summarizer;
pub mod types;

use tracing::info;

use crate::archive::{ArchiveOutcome, Archiver};
use crate::channels::Dispatcher;
use crate::clock::RunClock;
use crate::error::Result;
use crate::pipeline::resolver::ContentResolver;
use crate::pipeline::types::SourceTag;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub date: String,
    pub subject: String,
    pub source_tag: SourceTag,
    pub recipients: usize,
    pub archive: ArchiveOutcome,
}

/// Resolve, archive and send one digest.
pub struct DigestPipeline {
    resolver: ContentResolver,
    archiver: Archiver,
    dispatcher: Dispatcher,
}

impl DigestPipeline {
    pub fn new(resolver: ContentResolver, archiver: Archiver, dispatcher: Dispatcher) -> Self {
        Self {
            resolver,
            archiver,
            dispatcher,
        }
    }

    pub async fn run(&self, clock: &RunClock) -> Result<RunReport> {
        let resolved = self.resolver.resolve(clock).await?;
        info!(
            date = %resolved.digest.date,
            source = %resolved.source_tag,
            "Digest resolved"
        );

        let archive = self.archiver.archive(&resolved.archive_record()).await;
        info!(outcome = ?archive, "Archive step finished");

        self.dispatcher.dispatch(&resolved.digest).await?;
        let recipients = self.dispatcher.recipient_count();
        info!(subject = %resolved.digest.subject, recipients, "Sent");

        Ok(RunReport {
            date: resolved.digest.date,
            subject: resolved.digest.subject,
            source_tag: resolved.source_tag,
            recipients,
            archive,
        })
    }
}
