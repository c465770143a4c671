//! File-backed content-addressable article cache.
//!
//! One cache file per (source path, content hash) pair. Cache failures are
//! never fatal: a failed read behaves like a miss and a failed write is
//! logged and dropped, so the build proceeds as if no cache existed.

use folio_types::Article;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hidden cache directory under the content root
pub const CACHE_DIR: &str = ".folio-cache";

const NAME_LEN: usize = 16;

#[derive(Error, Debug)]
enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Hex digest of a file's raw bytes, used as the cache-validity key
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    path: String,
    hash: String,
    timestamp: i64,
    article: Article,
}

pub struct ArticleCache {
    dir: PathBuf,
}

impl ArticleCache {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            dir: base.as_ref().join(CACHE_DIR),
        }
    }

    /// Whether a trusted entry exists for this (path, hash) pair
    pub fn is_valid(&self, source: &Path, hash: &str) -> bool {
        self.load_entry(source, hash).is_some()
    }

    /// Read the cached article for this (path, hash) pair, if any
    pub fn read(&self, source: &Path, hash: &str) -> Option<Article> {
        self.load_entry(source, hash).map(|entry| entry.article)
    }

    /// Store a freshly parsed article. Failures are logged, not raised.
    pub fn write(&self, source: &Path, hash: &str, article: &Article) {
        if let Err(err) = self.try_write(source, hash, article) {
            tracing::warn!(path = %source.display(), "cache write failed: {err}");
        }
    }

    /// Cache file name combines a path hash with the content hash itself, so
    /// a changed file never collides with its own stale entry and distinct
    /// sources never share a file.
    fn entry_path(&self, source: &Path, hash: &str) -> PathBuf {
        let path_hash = blake3::hash(source.to_string_lossy().as_bytes()).to_hex();
        let content_part = &hash[..hash.len().min(NAME_LEN)];
        self.dir
            .join(format!("{}-{}.json", &path_hash[..NAME_LEN], content_part))
    }

    fn load_entry(&self, source: &Path, hash: &str) -> Option<CacheEntry> {
        let entry_path = self.entry_path(source, hash);
        let bytes = match fs::read(&entry_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %entry_path.display(), "cache read failed: {err}");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %entry_path.display(), "discarding corrupt cache entry: {err}");
                return None;
            }
        };

        // Both stored hash and stored path must match the lookup key; the
        // path check guards against hash collisions across differently-named
        // files.
        if entry.hash == hash && entry.path == source.to_string_lossy() {
            Some(entry)
        } else {
            None
        }
    }

    fn try_write(&self, source: &Path, hash: &str, article: &Article) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            path: source.to_string_lossy().into_owned(),
            hash: hash.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            article: article.clone(),
        };
        let bytes = serde_json::to_vec(&entry)?;
        fs::write(self.entry_path(source, hash), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::ArticleKind;

    fn sample_article() -> Article {
        let mut article = Article::empty(ArticleKind::Post);
        article.id = "abc123".into();
        article.title = "Cached".into();
        article.alias = "cached".into();
        article
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArticleCache::new(dir.path());
        let source = Path::new("posts/hello.md");
        let hash = content_hash(b"hello");

        assert!(!cache.is_valid(source, &hash));
        cache.write(source, &hash, &sample_article());
        assert!(cache.is_valid(source, &hash));
        assert_eq!(cache.read(source, &hash).unwrap().title, "Cached");
    }

    #[test]
    fn test_changed_content_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArticleCache::new(dir.path());
        let source = Path::new("posts/hello.md");

        cache.write(source, &content_hash(b"v1"), &sample_article());
        assert!(cache.read(source, &content_hash(b"v2")).is_none());
        // The old entry is superseded, not destroyed
        assert!(cache.is_valid(source, &content_hash(b"v1")));
    }

    #[test]
    fn test_distinct_paths_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArticleCache::new(dir.path());
        let hash = content_hash(b"same content");

        cache.write(Path::new("posts/a.md"), &hash, &sample_article());
        assert!(cache.read(Path::new("posts/b.md"), &hash).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArticleCache::new(dir.path());
        let source = Path::new("posts/hello.md");
        let hash = content_hash(b"hello");

        cache.write(source, &hash, &sample_article());
        let entry_path = cache.entry_path(source, &hash);
        fs::write(&entry_path, b"not json").unwrap();
        assert!(cache.read(source, &hash).is_none());
    }

    #[test]
    fn test_unwritable_cache_is_not_fatal() {
        // Base path is a file, so the cache dir cannot be created
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("base");
        fs::write(&blocker, b"file").unwrap();

        let cache = ArticleCache::new(&blocker);
        cache.write(Path::new("posts/a.md"), &content_hash(b"x"), &sample_article());
        assert!(cache.read(Path::new("posts/a.md"), &content_hash(b"x")).is_none());
    }
}
