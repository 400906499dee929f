//! On-disk response cache
//!
//! Bodies of successful responses are stored under the cache directory,
//! keyed by the SHA-256 of the request URL. The first line of an entry is
//! the URL the response was finally served from, so links on a cached page
//! resolve the same way they did after any redirect. A hit lets the fetcher
//! skip the network entirely. Entries never expire; delete the directory to
//! refresh.

use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// A response read back from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// URL the response was served from after redirects
    pub final_url: String,
    pub body: String,
}

/// Cache of raw response bodies keyed by URL
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Root directory of the cache
    dir: PathBuf,
}

impl ResponseCache {
    /// Creates a cache rooted at `dir`; the directory is created lazily
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the cache
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file a URL is cached in
    ///
    /// Entries are spread over subdirectories named after the first two hex
    /// characters of the key.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        self.dir.join(&key[..2]).join(&key)
    }

    /// Reads the cached response for `url`
    ///
    /// Missing, unreadable or malformed entries are treated as misses.
    pub async fn get(&self, url: &str) -> Option<CachedPage> {
        let entry = tokio::fs::read_to_string(self.path_for(url)).await.ok()?;
        let (final_url, body) = entry.split_once('\n')?;
        Url::parse(final_url).ok()?;

        Some(CachedPage {
            final_url: final_url.to_string(),
            body: body.to_string(),
        })
    }

    /// Stores `body`, served from `final_url`, as the cached response for `url`
    pub async fn put(&self, url: &str, final_url: &str, body: &str) -> io::Result<()> {
        let path = self.path_for(url);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, format!("{}\n{}", final_url, body)).await
    }
}
