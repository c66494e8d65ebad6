//! Configuration types, built from environment variables.
//!
//! Every loader takes a lookup function so tests can feed a map instead of
//! mutating the process environment. `from_env()` wraps `std::env::var`.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use lettre::message::Mailbox;
use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_TIME_ZONE: &str = "Europe/Prague";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SUBJECT_TEMPLATE: &str = "UX Daily · {{date}}";
pub const DEFAULT_PREHEADER_TEMPLATE: &str = "Denní UX přehled";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SOURCES_PATH: &str = "sources.yml";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Optional value: unset and blank are both treated as absent.
fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_mailbox(key: &str, raw: &str) -> Result<Mailbox, ConfigError> {
    raw.parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("invalid address {raw:?}: {e}"),
    })
}

// ── Schedule ────────────────────────────────────────────────────────

/// Time zone and time-guard switch. Loaded before anything else so a
/// guarded skip never requires the rest of the configuration.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub time_zone: Tz,
    pub time_guard_enabled: bool,
}

impl ScheduleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let zone_name =
            optional(&lookup, "TIMEZONE").unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
        let time_zone: Tz = zone_name.parse().map_err(|_| ConfigError::InvalidValue {
            key: "TIMEZONE".into(),
            message: format!("unknown time zone {zone_name:?}"),
        })?;

        let time_guard_enabled = optional(&lookup, "TIME_GUARD")
            .is_some_and(|v| v.eq_ignore_ascii_case("on"));

        Ok(Self {
            time_zone,
            time_guard_enabled,
        })
    }
}

// ── SMTP ────────────────────────────────────────────────────────────

/// Mail submission settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: Mailbox,
    pub recipients: Vec<Mailbox>,
}

impl SmtpConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = required(lookup, "SMTP_HOST")?;

        let port = match optional(lookup, "SMTP_PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "SMTP_PORT".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let username = required(lookup, "SMTP_USER")?;
        let password = SecretString::from(required(lookup, "SMTP_PASS")?);
        let from_address = parse_mailbox("FROM_EMAIL", &required(lookup, "FROM_EMAIL")?)?;

        let recipients = split_list(&required(lookup, "TO_EMAILS")?)
            .iter()
            .map(|raw| parse_mailbox("TO_EMAILS", raw))
            .collect::<Result<Vec<_>, _>>()?;
        if recipients.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TO_EMAILS".into(),
                message: "no recipients listed".into(),
            });
        }

        Ok(Self {
            host,
            port,
            username,
            password,
            from_address,
            recipients,
        })
    }
}

// ── Archive ─────────────────────────────────────────────────────────

/// Notion archival credentials. Absent means archival is disabled.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub token: SecretString,
    pub database_id: String,
}

impl ArchiveConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let token = optional(lookup, "NOTION_TOKEN")?;
        let database_id = optional(lookup, "NOTION_DATABASE_ID")?;
        Some(Self {
            token: SecretString::from(token),
            database_id,
        })
    }
}

// ── Summarizer ──────────────────────────────────────────────────────

/// LLM summarization settings. `api_key == None` disables the summarizer.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
}

impl SummarizerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: optional(lookup, "OPENAI_API_KEY").map(SecretString::from),
            model: optional(lookup, "SUMMARIZER_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZER_MODEL.to_string()),
        }
    }
}

// ── Digest ──────────────────────────────────────────────────────────

/// Default subject/preheader strings.
#[derive(Debug, Clone)]
pub struct DigestTemplates {
    /// Subject template; `{{date}}` is replaced with the human date.
    pub subject: String,
    pub preheader: String,
}

impl DigestTemplates {
    pub fn render_subject(&self, date_human: &str) -> String {
        self.subject.replace("{{date}}", date_human)
    }
}

impl Default for DigestTemplates {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT_TEMPLATE.to_string(),
            preheader: DEFAULT_PREHEADER_TEMPLATE.to_string(),
        }
    }
}

/// Everything a digest run needs besides the schedule.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub smtp: SmtpConfig,
    /// Lowercased keywords that boost an item's score.
    pub areas: Vec<String>,
    pub templates: DigestTemplates,
    pub archive: Option<ArchiveConfig>,
    pub summarizer: SummarizerConfig,
    pub sources_path: PathBuf,
    pub content_dir: PathBuf,
    pub feed_timeout: Duration,
}

impl DigestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let smtp = SmtpConfig::from_lookup(&lookup)?;

        let areas = split_list(&optional(&lookup, "AREAS").unwrap_or_default())
            .into_iter()
            .map(|a| a.to_lowercase())
            .collect();

        let templates = DigestTemplates {
            subject: optional(&lookup, "SUBJECT_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_SUBJECT_TEMPLATE.to_string()),
            preheader: optional(&lookup, "PREHEADER_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_PREHEADER_TEMPLATE.to_string()),
        };

        let feed_timeout_secs = match optional(&lookup, "FEED_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "FEED_TIMEOUT_SECS".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => DEFAULT_FEED_TIMEOUT_SECS,
        };

        Ok(Self {
            smtp,
            areas,
            templates,
            archive: ArchiveConfig::from_lookup(&lookup),
            summarizer: SummarizerConfig::from_lookup(&lookup),
            sources_path: optional(&lookup, "DIGEST_SOURCES_PATH")
                .unwrap_or_else(|| DEFAULT_SOURCES_PATH.to_string())
                .into(),
            content_dir: optional(&lookup, "DIGEST_CONTENT_DIR")
                .unwrap_or_else(|| DEFAULT_CONTENT_DIR.to_string())
                .into(),
            feed_timeout: Duration::from_secs(feed_timeout_secs),
        })
    }
}
