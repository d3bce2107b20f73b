//! Local file system source loader
//!
//! Reads one raw export file per uploaded [`SourceKey`] into memory. The
//! workflow only sees text: bytes that are not valid UTF-8 are replaced and
//! a leading byte-order mark is dropped, so spreadsheet exports saved in
//! odd encodings still reach the extractor.
//!
//! # Example
//!
//! ```ignore
//! use triangulation_infrastructure::SourceFileLoader;
//! use triangulation_domain::SourceKey;
//! use std::collections::BTreeMap;
//!
//! let paths = BTreeMap::from([(SourceKey::SearchKeywords, "keywords.csv".into())]);
//! let sources = SourceFileLoader::new().load(&paths).await?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use triangulation_domain::SourceKey;

const UTF8_BOM: char = '\u{feff}';

/// Failure to read a source file
#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("Could not read {key} from {path}: {source}")]
    Io {
        key: SourceKey,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{key} file {path} is empty")]
    Empty { key: SourceKey, path: PathBuf },
}

/// Loads source exports from the local file system.
#[derive(Debug, Clone, Default)]
pub struct SourceFileLoader {
    allow_empty: bool,
}

impl SourceFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept empty files instead of rejecting them; the workflow then
    /// marks that source failed.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Read every file, keyed by source.
    pub async fn load(
        &self,
        paths: &BTreeMap<SourceKey, PathBuf>,
    ) -> Result<BTreeMap<SourceKey, String>, SourceLoadError> {
        let mut sources = BTreeMap::new();
        for (&key, path) in paths {
            let text = self.load_one(key, path).await?;
            sources.insert(key, text);
        }
        Ok(sources)
    }

    async fn load_one(&self, key: SourceKey, path: &Path) -> Result<String, SourceLoadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SourceLoadError::Io {
                key,
                path: path.to_path_buf(),
                source,
            })?;

        let text = decode(&bytes);
        if text.trim().is_empty() && !self.allow_empty {
            return Err(SourceLoadError::Empty {
                key,
                path: path.to_path_buf(),
            });
        }

        debug!("Loaded {} from {} ({} bytes)", key, path.display(), bytes.len());
        Ok(text)
    }
}

fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if matches!(text, std::borrow::Cow::Owned(_)) {
        warn!("Source contained invalid UTF-8; replaced undecodable bytes");
    }
    text.strip_prefix(UTF8_BOM).unwrap_or(&*text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_reads_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let keywords = dir.path().join("keywords.csv");
        let chats = dir.path().join("chats.csv");
        std::fs::write(&keywords, "keyword,pageviews\n5 kva,120\n").unwrap();
        std::fs::write(&chats, "\u{feff}message\nneed 7.5 kva\n").unwrap();

        let paths = BTreeMap::from([
            (SourceKey::SearchKeywords, keywords),
            (SourceKey::LmsChats, chats),
        ]);
        let sources = SourceFileLoader::new().load(&paths).await.unwrap();

        assert_eq!(sources.len(), 2);
        assert!(sources[&SourceKey::SearchKeywords].starts_with("keyword"));
        assert!(sources[&SourceKey::LmsChats].starts_with("message"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let paths = BTreeMap::from([(
            SourceKey::PnsCalls,
            PathBuf::from("/nonexistent/calls.csv"),
        )]);

        let err = SourceFileLoader::new().load(&paths).await.unwrap_err();
        assert!(matches!(err, SourceLoadError::Io { key: SourceKey::PnsCalls, .. }));
    }

    #[tokio::test]
    async fn test_empty_file_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "  \n").unwrap();
        let paths = BTreeMap::from([(SourceKey::WhatsappSpecs, path)]);

        assert!(matches!(
            SourceFileLoader::new().load(&paths).await,
            Err(SourceLoadError::Empty { .. })
        ));
        assert!(SourceFileLoader::new().allow_empty(true).load(&paths).await.is_ok());
    }

    #[test]
    fn test_decode_replaces_invalid_bytes() {
        assert_eq!(decode(b"ok\xff"), "ok\u{fffd}");
    }
}
