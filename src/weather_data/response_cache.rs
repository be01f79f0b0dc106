//! On-disk cache of successful archive responses.
//!
//! Every entry is one bincode file under `<cache_dir>/http/`, named after the
//! SHA-256 of the request URL. Entries never expire unless an expiry is
//! configured.

use crate::weather_data::error::WeatherDataError;
use bincode::config::{Configuration, Fixint, LittleEndian};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CACHE_SUBDIR: &str = "http";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// A stored response body together with the request it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    /// Unix seconds at which the entry was written.
    pub stored_at: i64,
}

impl CachedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status,
            body,
            stored_at: Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    expire_after: Option<Duration>,
}

/// Hex SHA-256 of the request URL, used as the entry file stem.
fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

impl ResponseCache {
    pub fn new(cache_dir: &Path, expire_after: Option<Duration>) -> Self {
        Self {
            dir: cache_dir.join(CACHE_SUBDIR),
            expire_after,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", url_digest(url)))
    }

    /// Looks up the entry for `url`.
    ///
    /// Expired entries, hash collisions and unreadable files count as misses.
    pub async fn get(&self, url: &str) -> Result<Option<CachedResponse>, WeatherDataError> {
        let path = self.entry_path(url);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Cache miss for {}", url);
                return Ok(None);
            }
            Err(e) => return Err(WeatherDataError::CacheRead(path, e)),
        };

        let decode_path = path.clone();
        let decoded = tokio::task::spawn_blocking(move || Self::decode(&bytes, &decode_path)).await?;
        let entry = match decoded {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {:?}: {}", path, e);
                return Ok(None);
            }
        };

        if entry.url != url {
            debug!("Cache key collision at {:?}, treating as miss", path);
            return Ok(None);
        }
        if self.is_expired(&entry) {
            debug!("Cache entry for {} expired", url);
            return Ok(None);
        }

        info!("Cache hit for {} at {:?}", url, path);
        Ok(Some(entry))
    }

    pub async fn put(&self, entry: CachedResponse) -> Result<(), WeatherDataError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WeatherDataError::CacheDirCreation(self.dir.clone(), e))?;

        let path = self.entry_path(&entry.url);
        let encoded = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(entry, BINCODE_CONFIG)
                .map_err(|e| WeatherDataError::CacheEncode(Box::new(e)))
        })
        .await??;
        tokio::fs::write(&path, &encoded)
            .await
            .map_err(|e| WeatherDataError::CacheWrite(path.clone(), e))?;
        debug!("Cached {} bytes to {:?}", encoded.len(), path);
        Ok(())
    }

    /// Removes every stored response.
    pub async fn clear(&self) -> Result<(), WeatherDataError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WeatherDataError::CacheDeletion(self.dir.clone(), e)),
        }
    }

    fn decode(bytes: &[u8], path: &Path) -> Result<CachedResponse, WeatherDataError> {
        let (entry, _) = bincode::serde::decode_from_slice::<CachedResponse, _>(bytes, BINCODE_CONFIG)
            .map_err(|e| WeatherDataError::CacheDecode(path.to_path_buf(), Box::new(e)))?;
        Ok(entry)
    }

    fn is_expired(&self, entry: &CachedResponse) -> bool {
        match self.expire_after {
            None => false,
            Some(max_age) => {
                let age = Utc::now().timestamp().saturating_sub(entry.stored_at);
                u64::try_from(age).map_or(false, |age| age >= max_age.as_secs())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const URL: &str = "https://archive-api.open-meteo.com/v1/archive?latitude=52.52";

    #[test]
    fn test_url_digest_is_sha256_hex() {
        assert_eq!(
            url_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            url_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_entry_path_is_stable_and_distinct() {
        let cache = ResponseCache::new(Path::new(".cache"), None);
        assert_eq!(cache.entry_path(URL), cache.entry_path(URL));
        assert_ne!(cache.entry_path(URL), cache.entry_path("https://example.com"));
        assert!(cache.entry_path(URL).starts_with(".cache/http"));
        assert_eq!(
            cache.entry_path(URL).file_name().and_then(|name| name.to_str()),
            Some(format!("{}.bin", url_digest(URL)).as_str())
        );
    }

    #[tokio::test]
    async fn test_put_then_get() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ResponseCache::new(dir.path(), None);

        assert!(cache.get(URL).await?.is_none());

        let entry = CachedResponse::new(URL, 200, b"{\"latitude\":52.52}".to_vec());
        cache.put(entry.clone()).await?;

        let hit = cache.get(URL).await?.expect("entry should be cached");
        assert_eq!(hit, entry);
        Ok(())
    }

    #[tokio::test]
    async fn test_entries_never_expire_by_default() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ResponseCache::new(dir.path(), None);
        let mut entry = CachedResponse::new(URL, 200, b"old".to_vec());
        entry.stored_at = 0;
        cache.put(entry).await?;

        assert!(cache.get(URL).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ResponseCache::new(dir.path(), Some(Duration::from_secs(60)));
        let mut entry = CachedResponse::new(URL, 200, b"old".to_vec());
        entry.stored_at = Utc::now().timestamp() - 3600;
        cache.put(entry).await?;

        assert!(cache.get(URL).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ResponseCache::new(dir.path(), None);
        std::fs::create_dir_all(cache.dir())?;
        std::fs::write(cache.entry_path(URL), b"\x01")?;

        assert!(cache.get(URL).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_removes_entries() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ResponseCache::new(dir.path(), None);
        cache.put(CachedResponse::new(URL, 200, b"body".to_vec())).await?;

        cache.clear().await?;
        assert!(cache.get(URL).await?.is_none());
        // Clearing an absent cache is fine too.
        cache.clear().await?;
        Ok(())
    }
}
