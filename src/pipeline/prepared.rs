//! Prepared content: hand-written overrides stored per date.
//!
//! For a date key `2025-03-07` the store looks at
//! `<dir>/2025-03-07.html`, `.txt` and `.json`. Each file is optional.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::pipeline::types::{DigestMeta, PreparedContent};

/// Reads prepared content from a directory.
#[derive(Debug, Clone)]
pub struct PreparedStore {
    dir: PathBuf,
}

impl PreparedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load whatever parts exist for `date_key`.
    ///
    /// An empty HTML file counts as absent. Malformed metadata is an error.
    pub fn load(&self, date_key: &str) -> Result<PreparedContent, ConfigError> {
        let html = read_optional(&self.path_for(date_key, "html"))?
            .filter(|html| !html.trim().is_empty());
        let text = read_optional(&self.path_for(date_key, "txt"))?;

        let meta_path = self.path_for(date_key, "json");
        let meta = match read_optional(&meta_path)? {
            Some(raw) => {
                serde_json::from_str::<DigestMeta>(&raw).map_err(|e| ConfigError::PreparedMeta {
                    path: meta_path.clone(),
                    reason: e.to_string(),
                })?
            }
            None => DigestMeta::default(),
        };

        debug!(
            date = date_key,
            has_html = html.is_some(),
            has_text = text.is_some(),
            has_subject = meta.subject.is_some(),
            has_preheader = meta.preheader.is_some(),
            "Loaded prepared content"
        );

        Ok(PreparedContent { html, text, meta })
    }

    fn path_for(&self, date_key: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{date_key}.{ext}"))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "2025-03-07";

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, PreparedStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        let store = PreparedStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn nothing_prepared() {
        let (_dir, store) = store_with(&[]);
        assert_eq!(store.load(DATE).unwrap(), PreparedContent::default());
    }

    #[test]
    fn missing_directory_means_nothing_prepared() {
        let store = PreparedStore::new("/definitely/not/here");
        assert_eq!(store.load(DATE).unwrap(), PreparedContent::default());
    }

    #[test]
    fn loads_all_parts() {
        let (_dir, store) = store_with(&[
            ("2025-03-07.html", "<p>Hand written</p>\n"),
            ("2025-03-07.txt", "Hand written\n"),
            ("2025-03-07.json", r#"{"subject": "Special", "preheader": "Just today"}"#),
        ]);
        let prepared = store.load(DATE).unwrap();
        assert_eq!(prepared.html.as_deref(), Some("<p>Hand written</p>\n"));
        assert_eq!(prepared.text.as_deref(), Some("Hand written\n"));
        assert_eq!(prepared.meta.subject.as_deref(), Some("Special"));
        assert_eq!(prepared.meta.preheader.as_deref(), Some("Just today"));
    }

    #[test]
    fn other_dates_are_ignored() {
        let (_dir, store) = store_with(&[("2025-03-06.html", "<p>Yesterday</p>")]);
        assert!(store.load(DATE).unwrap().html.is_none());
    }

    #[test]
    fn blank_html_counts_as_absent() {
        let (_dir, store) = store_with(&[("2025-03-07.html", "  \n")]);
        assert!(store.load(DATE).unwrap().html.is_none());
    }

    #[test]
    fn metadata_alone_is_loaded() {
        let (_dir, store) = store_with(&[("2025-03-07.json", r#"{"subject": "X"}"#)]);
        let prepared = store.load(DATE).unwrap();
        assert!(prepared.html.is_none());
        assert_eq!(prepared.meta.subject.as_deref(), Some("X"));
        assert!(prepared.meta.preheader.is_none());
    }

    #[test]
    fn malformed_metadata_is_config_error() {
        let (_dir, store) = store_with(&[("2025-03-07.json", "{not json")]);
        assert!(matches!(
            store.load(DATE),
            Err(ConfigError::PreparedMeta { .. })
        ));
    }
}
