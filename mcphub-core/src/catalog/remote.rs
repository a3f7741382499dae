//! Fetching the published catalog over HTTP
//!
//! Responses are memoized per URL in an [`ExpiringCache`] owned by the
//! [`RemoteCatalog`], so repeated searches within the freshness window do
//! not hit the network. With a cache directory configured, fetched
//! catalogs are also written to disk so the next process can reuse them;
//! their age is judged by the same clock as the in-memory entries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::record::ServerRecord;
use crate::cache::{Clock, ExpiringCache, SystemClock, DEFAULT_TTL};

/// Records fetched from one URL
pub type SharedRecords = Arc<Vec<ServerRecord>>;

/// On-disk form of one cached catalog
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedCatalog {
    url: String,

    /// Clock reading at fetch time, in milliseconds
    cached_at_ms: u64,

    records: Vec<ServerRecord>,
}

/// HTTP client side of the published catalog
pub struct RemoteCatalog<C: Clock = SystemClock> {
    cache: Mutex<ExpiringCache<String, SharedRecords, C>>,
    cache_dir: Option<PathBuf>,
    timeout: Duration,
}

impl RemoteCatalog<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_cache(ExpiringCache::new(ttl))
    }
}

impl Default for RemoteCatalog<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<C: Clock + Send> RemoteCatalog<C> {
    pub fn with_cache(cache: ExpiringCache<String, SharedRecords, C>) -> Self {
        Self {
            cache: Mutex::new(cache),
            cache_dir: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Also persist fetched catalogs under `dir`
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Fetch the catalog at `url`
    ///
    /// Uses the cached copy if it is still fresh. Set `force_refresh` to
    /// bypass the cache and fetch fresh data.
    pub async fn fetch(&self, url: &str, force_refresh: bool) -> Result<SharedRecords> {
        if !force_refresh {
            if let Some(records) = self.cached(url).await {
                tracing::debug!(url, records = records.len(), "Using cached catalog");
                return Ok(records);
            }
        }

        let body = fetch_body(url, self.timeout).await?;
        let records: SharedRecords = Arc::new(
            parse_catalog(&body).with_context(|| format!("Failed to parse catalog from {url}"))?,
        );
        tracing::debug!(url, records = records.len(), "Fetched catalog");

        self.remember(url, Arc::clone(&records)).await;
        Ok(records)
    }

    /// Store `records` as the fresh catalog for `url`
    ///
    /// Disk write failures are logged and otherwise ignored.
    pub async fn remember(&self, url: &str, records: SharedRecords) {
        let stored_at = {
            let mut cache = self.cache.lock().await;
            cache.insert(url.to_string(), Arc::clone(&records));
            cache.stored_at(&url.to_string())
        };

        let (Some(dir), Some(stored_at)) = (&self.cache_dir, stored_at) else {
            return;
        };

        if let Err(e) = save_to_disk(dir, url, stored_at, &records).await {
            tracing::warn!(url, error = %e, "Failed to persist catalog cache");
        }
    }

    /// Forget every cached response, on disk as well
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.lock().await.clear();

        let Some(dir) = &self.cache_dir else {
            return Ok(());
        };
        if !dir.exists() {
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read cache directory: {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_cache_file(&path) {
                tokio::fs::remove_file(&path)
                    .await
                    .with_context(|| format!("Failed to remove cache: {}", path.display()))?;
            }
        }

        tracing::debug!(dir = %dir.display(), "Cleared catalog cache");
        Ok(())
    }

    /// Fresh in-memory entry, falling back to the persisted copy
    async fn cached(&self, url: &str) -> Option<SharedRecords> {
        let key = url.to_string();
        let mut cache = self.cache.lock().await;

        if let Some(records) = cache.get(&key) {
            return Some(records);
        }

        let dir = self.cache_dir.as_deref()?;
        let cached = match load_from_disk(dir, url).await {
            Ok(cached) => cached?,
            Err(e) => {
                tracing::warn!(url, error = %e, "Ignoring unreadable catalog cache");
                return None;
            }
        };

        // Aged by the cache's own clock; a stale copy is dropped by `get`
        cache.insert_at(
            key.clone(),
            Arc::new(cached.records),
            Duration::from_millis(cached.cached_at_ms),
        );
        let fresh = cache.get(&key);
        if fresh.is_none() {
            tracing::debug!(url, "Persisted catalog cache expired");
        }
        fresh
    }
}

/// Cache file for a URL: `catalog_<hash>.json`
fn cache_path_for_url(dir: &Path, url: &str) -> PathBuf {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let hash = hasher.finish();

    dir.join(format!("catalog_{hash:016x}.json"))
}

fn is_cache_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("catalog_") && n.ends_with(".json"))
}

async fn load_from_disk(dir: &Path, url: &str) -> Result<Option<CachedCatalog>> {
    let path = cache_path_for_url(dir, url);
    if !path.exists() {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read cache: {}", path.display()))?;
    let cached: CachedCatalog = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cache: {}", path.display()))?;

    // Hash collision: treat as a miss
    if cached.url != url {
        return Ok(None);
    }

    Ok(Some(cached))
}

async fn save_to_disk(
    dir: &Path,
    url: &str,
    stored_at: Duration,
    records: &[ServerRecord],
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

    let path = cache_path_for_url(dir, url);
    let cached = CachedCatalog {
        url: url.to_string(),
        cached_at_ms: stored_at.as_millis() as u64,
        records: records.to_vec(),
    };
    let content = serde_json::to_string(&cached).context("Failed to serialize cache")?;

    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write cache: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Saved catalog to cache");
    Ok(())
}

/// Parse a catalog document, skipping entries that do not fit the schema
pub fn parse_catalog(body: &str) -> Result<Vec<ServerRecord>> {
    let entries: Vec<Value> =
        serde_json::from_str(body).context("Catalog is not a JSON array of records")?;

    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed catalog record");
                None
            }
        })
        .collect();

    Ok(records)
}

#[cfg(feature = "remote")]
async fn fetch_body(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("mcphub/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch catalog from {url}"))?;

    if !response.status().is_success() {
        return Err(crate::error::CatalogError::Fetch {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }

    response
        .text()
        .await
        .context("Failed to read response body")
}

/// Stub for when the remote feature is disabled
#[cfg(not(feature = "remote"))]
async fn fetch_body(_url: &str, _timeout: Duration) -> Result<String> {
    anyhow::bail!("Remote catalog support is not enabled. Rebuild with --features remote")
}

#[cfg(test)]
mod remote_tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::catalog::record::{Category, Complexity};
    use crate::catalog::test_support::record;

    #[test]
    fn test_parse_catalog_skips_malformed_entries() {
        let body = r#"[
  {
    "id": "ok",
    "name": "Ok",
    "description": "Fine",
    "author": "me",
    "repository": "https://github.com/me/ok",
    "tags": [],
    "category": "database",
    "language": "go",
    "complexity": "advanced",
    "features": ["x"],
    "lastUpdated": "2025-05-05"
  },
  { "id": "broken", "category": "spaceships" }
]"#;

        let records = parse_catalog(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
        assert_eq!(records[0].stars, None);
    }

    #[test]
    fn test_parse_catalog_rejects_non_array() {
        assert!(parse_catalog("{}").is_err());
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_skips_network() {
        let url = "http://catalog.invalid/data/servers.json";
        let clock = ManualClock::new();
        let mut cache = ExpiringCache::with_clock(Duration::from_secs(300), clock.clone());
        cache.insert(
            url.to_string(),
            Arc::new(vec![record("cached", "Cached", Category::Other, Complexity::Beginner)]),
        );

        let remote = RemoteCatalog::with_cache(cache);
        let records = remote.fetch(url, false).await.unwrap();
        assert_eq!(records[0].id, "cached");

        // Once expired the fetch has to go to the (unreachable) host
        clock.advance(Duration::from_secs(301));
        assert!(remote.fetch(url, false).await.is_err());
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_fresh_entry() {
        let url = "http://catalog.invalid/data/servers.json";
        let mut cache = ExpiringCache::with_clock(Duration::from_secs(300), ManualClock::new());
        cache.insert(
            url.to_string(),
            Arc::new(vec![record("cached", "Cached", Category::Other, Complexity::Beginner)]),
        );

        let remote = RemoteCatalog::with_cache(cache);
        assert!(remote.fetch(url, true).await.is_err());
        // The fresh entry is still served without a refresh
        assert_eq!(remote.fetch(url, false).await.unwrap()[0].id, "cached");
    }

    fn on_disk(dir: &Path, clock: &ManualClock) -> RemoteCatalog<ManualClock> {
        RemoteCatalog::with_cache(ExpiringCache::with_clock(
            Duration::from_secs(300),
            clock.clone(),
        ))
        .with_cache_dir(dir)
    }

    #[tokio::test]
    async fn test_persisted_catalog_is_reused_by_next_instance() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let url = "http://catalog.invalid/data/servers.json";
        let clock = ManualClock::new();
        clock.advance(Duration::from_secs(10_000));

        let first = on_disk(temp_dir.path(), &clock);
        first
            .remember(
                url,
                Arc::new(vec![record("aci-mcp", "ACI MCP", Category::Network, Complexity::Advanced)]),
            )
            .await;
        assert!(cache_path_for_url(temp_dir.path(), url).exists());

        clock.advance(Duration::from_secs(120));
        let second = on_disk(temp_dir.path(), &clock);
        let records = second.fetch(url, false).await.unwrap();
        assert_eq!(records[0].id, "aci-mcp");

        // Refresh skips the persisted copy and goes to the (unreachable) host
        let third = on_disk(temp_dir.path(), &clock);
        assert!(third.fetch(url, true).await.is_err());
    }

    #[tokio::test]
    async fn test_persisted_catalog_expires() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let url = "http://catalog.invalid/data/servers.json";
        let clock = ManualClock::new();

        on_disk(temp_dir.path(), &clock)
            .remember(
                url,
                Arc::new(vec![record("aci-mcp", "ACI MCP", Category::Network, Complexity::Advanced)]),
            )
            .await;

        clock.advance(Duration::from_secs(300));
        assert!(on_disk(temp_dir.path(), &clock).fetch(url, false).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_cache_file_is_a_miss() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let url = "http://catalog.invalid/data/servers.json";
        std::fs::write(cache_path_for_url(temp_dir.path(), url), "not json").unwrap();

        let remote = on_disk(temp_dir.path(), &ManualClock::new());
        assert!(remote.cached(url).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let url = "http://catalog.invalid/data/servers.json";
        let other = temp_dir.path().join("keep.txt");
        std::fs::write(&other, "unrelated").unwrap();

        let remote = on_disk(temp_dir.path(), &ManualClock::new());
        remote.remember(url, Arc::new(Vec::new())).await;
        assert!(cache_path_for_url(temp_dir.path(), url).exists());

        remote.clear_cache().await.unwrap();
        assert!(!cache_path_for_url(temp_dir.path(), url).exists());
        assert!(other.exists());
        assert!(remote.cached(url).await.is_none());
    }
}
