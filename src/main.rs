use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use daily_digest::archive::Archiver;
use daily_digest::channels::Dispatcher;
use daily_digest::clock::{RunClock, TimeGuard};
use daily_digest::config::{DigestConfig, ScheduleConfig};
use daily_digest::llm::{LlmConfig, LlmProvider, create_provider};
use daily_digest::pipeline::DigestPipeline;
use daily_digest::pipeline::prepared::PreparedStore;
use daily_digest::pipeline::rank::Ranker;
use daily_digest::pipeline::resolver::ContentResolver;
use daily_digest::pipeline::summarizer::Summarizer;
use daily_digest::sources::{HttpFeedFetcher, SourceCatalog};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Digest run failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let schedule = ScheduleConfig::from_env().context("Failed to load schedule settings")?;
    let clock = RunClock::now(schedule.time_zone);

    if !TimeGuard::new(schedule.time_guard_enabled).permits(&clock) {
        info!(
            now = %clock.instant().format("%H:%M %Z"),
            "Outside the send window, skipping run"
        );
        return Ok(());
    }

    let config = DigestConfig::from_env().context("Failed to load digest configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        date = %clock.date_key(),
        areas = ?config.areas,
        recipients = config.smtp.recipients.len(),
        "Starting digest run"
    );

    let report = build_pipeline(&config).run(&clock).await?;
    info!(
        date = %report.date,
        source = %report.source_tag,
        archive = ?report.archive,
        "Digest run complete"
    );
    Ok(())
}

fn build_pipeline(config: &DigestConfig) -> DigestPipeline {
    let ranker = Ranker::new(Arc::new(HttpFeedFetcher::new(config.feed_timeout)));

    let resolver = ContentResolver::new(
        PreparedStore::new(&config.content_dir),
        SourceCatalog::new(&config.sources_path),
        ranker,
        Summarizer::new(summarizer_provider(config)),
        config.templates.clone(),
        config.areas.clone(),
    );

    DigestPipeline::new(
        resolver,
        Archiver::new(config.archive.clone()),
        Dispatcher::from_config(&config.smtp),
    )
}

/// The summarizer is optional: a missing key or a client that cannot be built
/// both leave it disabled.
fn summarizer_provider(config: &DigestConfig) -> Option<Arc<dyn LlmProvider>> {
    let api_key = config.summarizer.api_key.clone()?;
    let llm_config = LlmConfig {
        api_key,
        model: config.summarizer.model.clone(),
    };
    match create_provider(&llm_config) {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!(error = %e, "Summarizer unavailable");
            None
        }
    }
}
