//! Feed catalog: the declarative list of feeds, read from YAML.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::pipeline::types::Feed;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    feeds: Vec<Feed>,
}

/// Loads the feed list from a single file.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    path: PathBuf,
}

impl SourceCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and parse the catalog. Absent file, bad YAML or a missing
    /// `feeds` list are all configuration errors.
    pub fn load(&self) -> Result<Vec<Feed>, ConfigError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Catalog {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let parsed: CatalogFile =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::Catalog {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %self.path.display(), feeds = parsed.feeds.len(), "Loaded feed catalog");
        Ok(parsed.feeds)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn catalog_with(contents: &str) -> (tempfile::NamedTempFile, SourceCatalog) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let catalog = SourceCatalog::new(file.path());
        (file, catalog)
    }

    #[test]
    fn loads_feeds_in_file_order() {
        let (_file, catalog) = catalog_with(
            "feeds:\n  - name: Nielsen Norman Group\n    url: https://www.nngroup.com/feed/rss/\n  - name: Figma Blog\n    url: https://www.figma.com/blog/feed/\n",
        );
        let feeds = catalog.load().unwrap();
        assert_eq!(
            feeds,
            vec![
                Feed::new("Nielsen Norman Group", "https://www.nngroup.com/feed/rss/"),
                Feed::new("Figma Blog", "https://www.figma.com/blog/feed/"),
            ]
        );
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SourceCatalog::new(dir.path().join("sources.yml"));
        assert!(matches!(catalog.load(), Err(ConfigError::Catalog { .. })));
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let (_file, catalog) = catalog_with("feeds: [unterminated\n");
        assert!(matches!(catalog.load(), Err(ConfigError::Catalog { .. })));
    }

    #[test]
    fn missing_feed_list_is_config_error() {
        let (_file, catalog) = catalog_with("sources:\n  - name: X\n    url: https://x\n");
        let err = catalog.load().unwrap_err();
        assert!(err.to_string().contains("feeds"));
    }

    #[test]
    fn entry_without_url_is_config_error() {
        let (_file, catalog) = catalog_with("feeds:\n  - name: X\n");
        assert!(matches!(catalog.load(), Err(ConfigError::Catalog { .. })));
    }
}
