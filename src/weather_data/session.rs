//! HTTP session used for every archive request: a `reqwest` client behind a
//! response cache and a retry policy.

use crate::weather_data::error::WeatherDataError;
use crate::weather_data::response_cache::{CachedResponse, ResponseCache};
use crate::weather_data::retry::{default_retry_statuses, RetryPolicy};
use bon::Builder;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use std::path::PathBuf;
use std::time::Duration;

/// Cache location used when none is configured, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Settings for [`CachedSession`].
///
/// The defaults cache every successful response forever under `.cache/` and
/// retry failed requests 5 times with a backoff factor of 0.2.
///
/// # Examples
///
/// ```
/// use meteo_archive::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::builder()
///     .cache_dir("/tmp/archive-cache")
///     .retries(2)
///     .expire_after(Duration::from_secs(3600))
///     .build();
///
/// assert_eq!(config.retries, 2);
/// assert_eq!(config.backoff_factor, 0.2);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct SessionConfig {
    #[builder(into, default = PathBuf::from(DEFAULT_CACHE_DIR))]
    pub cache_dir: PathBuf,
    /// `None` keeps cached responses forever.
    pub expire_after: Option<Duration>,
    #[builder(default = 5)]
    pub retries: u32,
    #[builder(default = 0.2)]
    pub backoff_factor: f64,
    #[builder(default = default_retry_statuses())]
    pub retry_statuses: Vec<StatusCode>,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::builder().build()
    }
}

impl SessionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retries,
            self.backoff_factor,
            self.retry_statuses.clone(),
        )
    }
}

/// A response body returned by [`CachedSession::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    /// Whether the body was served from the on-disk cache.
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct CachedSession {
    client: Client,
    cache: ResponseCache,
    retry: RetryPolicy,
}

impl CachedSession {
    pub fn new(config: &SessionConfig) -> Result<Self, WeatherDataError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(WeatherDataError::ClientBuild)?;
        Ok(Self {
            client,
            cache: ResponseCache::new(&config.cache_dir, config.expire_after),
            retry: config.retry_policy(),
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// GETs `url`, answering from the cache when possible.
    ///
    /// Successful responses are stored. Other responses that are not retryable
    /// (e.g. `400 Bad Request`) are returned as-is so the caller can read the body.
    pub async fn get(&self, url: &Url) -> Result<SessionResponse, WeatherDataError> {
        if let Some(hit) = self.cache.get(url.as_str()).await? {
            return Ok(SessionResponse {
                status: StatusCode::from_u16(hit.status).unwrap_or(StatusCode::OK),
                body: hit.body,
                from_cache: true,
            });
        }

        let response = self.send_with_retries(url).await?;
        if response.status.is_success() {
            self.cache
                .put(CachedResponse::new(
                    url.as_str(),
                    response.status.as_u16(),
                    response.body.clone(),
                ))
                .await?;
        }
        Ok(response)
    }

    async fn send_with_retries(&self, url: &Url) -> Result<SessionResponse, WeatherDataError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            let failure = match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if self.retry.is_retryable_status(status) {
                        warn!("HTTP {} from {} on attempt {}", status, url, attempt);
                        WeatherDataError::HttpStatus {
                            url: url.to_string(),
                            status,
                        }
                    } else {
                        match response.bytes().await {
                            Ok(body) => {
                                info!("Downloaded {} bytes from {} ({})", body.len(), url, status);
                                return Ok(SessionResponse {
                                    status,
                                    body: body.to_vec(),
                                    from_cache: false,
                                });
                            }
                            Err(e) if self.retry.is_retryable_read_error(&e) => {
                                warn!("Reading body from {} failed on attempt {}: {}", url, attempt, e);
                                WeatherDataError::NetworkRequest(url.to_string(), e)
                            }
                            Err(e) => return Err(WeatherDataError::NetworkRequest(url.to_string(), e)),
                        }
                    }
                }
                Err(e) if self.retry.is_retryable_error(&e) => {
                    warn!("Network error on attempt {} for {}: {}", attempt, url, e);
                    WeatherDataError::NetworkRequest(url.to_string(), e)
                }
                Err(e) => return Err(WeatherDataError::NetworkRequest(url.to_string(), e)),
            };

            if attempt >= max_attempts {
                return Err(WeatherDataError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last_error: Box::new(failure),
                });
            }

            let pause = self.retry.backoff(attempt);
            if !pause.is_zero() {
                debug!("Backing off {:.1}s before retrying {}", pause.as_secs_f64(), url);
                tokio::time::sleep(pause).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.expire_after, None);
        assert_eq!(config.retries, 5);
        assert_eq!(config.backoff_factor, 0.2);
        assert_eq!(
            config.retry_statuses,
            vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::GATEWAY_TIMEOUT
            ]
        );
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = SessionConfig::builder().retries(2).backoff_factor(1.0).build();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
    }

    #[test]
    fn test_session_uses_configured_cache_dir() -> Result<(), WeatherDataError> {
        let config = SessionConfig::builder().cache_dir("/tmp/somewhere").build();
        let session = CachedSession::new(&config)?;
        assert!(session.cache().dir().starts_with("/tmp/somewhere"));
        Ok(())
    }

    fn quick_session(cache_dir: &std::path::Path) -> Result<CachedSession, WeatherDataError> {
        CachedSession::new(
            &SessionConfig::builder()
                .cache_dir(cache_dir)
                .retries(2)
                .backoff_factor(0.0)
                .build(),
        )
    }

    /// Serves a body that stops short of its `Content-Length` on the first
    /// connection and a complete `[]` afterwards.
    async fn truncating_server() -> std::io::Result<(String, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = counter.fetch_add(1, Ordering::SeqCst);
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let reply: &[u8] = if seen == 0 {
                    b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n["
                } else {
                    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]"
                };
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            }
        });
        Ok((format!("http://{}/v1/archive", addr), connections))
    }

    #[tokio::test]
    async fn test_truncated_body_is_retried() -> Result<(), Box<dyn std::error::Error>> {
        let cache = tempdir()?;
        let (url, connections) = truncating_server().await?;
        let session = quick_session(cache.path())?;

        let response = session.get(&Url::parse(&url)?).await?;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"[]".to_vec());
        assert!(!response.from_cache);
        assert_eq!(connections.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_refused_exhausts_retries() -> Result<(), Box<dyn std::error::Error>> {
        let cache = tempdir()?;
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
            listener.local_addr()?.port()
        };
        let session = quick_session(cache.path())?;

        let url = Url::parse(&format!("http://127.0.0.1:{}/v1/archive", port))?;
        match session.get(&url).await {
            Err(WeatherDataError::RetriesExhausted {
                attempts,
                last_error,
                ..
            }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last_error, WeatherDataError::NetworkRequest(..)));
            }
            other => panic!("expected exhausted retries, got {:?}", other),
        }
        assert!(session.cache().get(url.as_str()).await?.is_none());
        Ok(())
    }
}
