//! This module provides the main entry point for reading the Open-Meteo
//! historical archive. It wires a cached, retrying HTTP session to the archive
//! endpoint and reshapes responses into Polars frames.

use crate::error::ArchiveError;
use crate::types::query::{ArchiveQuery, LatLon};
use crate::types::response::LocationResponse;
use crate::types::weather_tables::WeatherTables;
use crate::utils::{ensure_cache_dir_exists, get_user_cache_dir};
use crate::weather_data::fetcher::{first_location, ArchiveFetcher, ARCHIVE_URL};
use crate::weather_data::session::{CachedSession, SessionConfig};
use bon::bon;
use chrono::NaiveDate;
use url::Url;

/// The main client for the Open-Meteo historical archive.
///
/// Every request goes through a [`CachedSession`]: responses are cached on disk
/// (under `.cache/` by default, never expiring) and failed requests are retried
/// with exponential backoff. Repeating a query therefore costs no network
/// traffic once it has succeeded.
///
/// Create an instance using [`OpenMeteoArchive::new()`] for default behavior or
/// [`OpenMeteoArchive::with_session()`] to control caching and retries.
///
/// # Examples
///
/// ```no_run
/// # use meteo_archive::{ArchiveError, ArchiveQuery, OpenMeteoArchive};
/// # async fn run() -> Result<(), ArchiveError> {
/// let archive = OpenMeteoArchive::new().await?;
/// let tables = archive.tables(&ArchiveQuery::default()).await?;
/// println!("{}", tables.hourly.frame);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenMeteoArchive {
    fetcher: ArchiveFetcher,
}

#[bon]
impl OpenMeteoArchive {
    /// Creates a client with the default [`SessionConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CacheDirCreation`] if `.cache/` cannot be created, or
    /// [`ArchiveError::WeatherData`] if the HTTP client cannot be built.
    pub async fn new() -> Result<Self, ArchiveError> {
        Self::with_session(SessionConfig::default()).await
    }

    /// Creates a client that caches in the per-user cache directory
    /// (e.g. `~/.cache/meteo_archive_cache` on Linux) instead of `.cache/`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CacheDirResolution`] if the platform has no cache directory.
    pub async fn with_user_cache() -> Result<Self, ArchiveError> {
        let cache_dir = get_user_cache_dir().map_err(ArchiveError::CacheDirResolution)?;
        Self::with_session(SessionConfig::builder().cache_dir(cache_dir).build()).await
    }

    /// Creates a client with a custom session configuration.
    ///
    /// The cache directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CacheDirCreation`] if the cache directory cannot be created,
    /// or [`ArchiveError::WeatherData`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use meteo_archive::{ArchiveError, OpenMeteoArchive, SessionConfig};
    /// # use std::time::Duration;
    /// # async fn run() -> Result<(), ArchiveError> {
    /// let config = SessionConfig::builder()
    ///     .cache_dir("/tmp/archive-cache")
    ///     .expire_after(Duration::from_secs(24 * 3600))
    ///     .retries(3)
    ///     .build();
    /// let archive = OpenMeteoArchive::with_session(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_session(config: SessionConfig) -> Result<Self, ArchiveError> {
        let endpoint = Url::parse(ARCHIVE_URL)
            .map_err(|e| ArchiveError::InvalidEndpoint(ARCHIVE_URL.to_string(), e))?;
        Self::connect(config, endpoint).await
    }

    /// Creates a client against another archive-compatible endpoint, such as a
    /// self-hosted Open-Meteo instance or a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidEndpoint`] if `endpoint` is not a valid URL, plus
    /// the errors of [`OpenMeteoArchive::with_session`].
    pub async fn with_endpoint(config: SessionConfig, endpoint: &str) -> Result<Self, ArchiveError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| ArchiveError::InvalidEndpoint(endpoint.to_string(), e))?;
        Self::connect(config, endpoint).await
    }

    async fn connect(config: SessionConfig, endpoint: Url) -> Result<Self, ArchiveError> {
        ensure_cache_dir_exists(&config.cache_dir)
            .await
            .map_err(|e| ArchiveError::CacheDirCreation(config.cache_dir.clone(), e))?;
        let session = CachedSession::new(&config)?;
        Ok(Self {
            fetcher: ArchiveFetcher::new(session, endpoint),
        })
    }

    pub fn fetcher(&self) -> &ArchiveFetcher {
        &self.fetcher
    }

    /// Fetches the raw, typed responses for `query`, one per location.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::WeatherData`] for network, cache, API and parse failures.
    pub async fn fetch(&self, query: &ArchiveQuery) -> Result<Vec<LocationResponse>, ArchiveError> {
        Ok(self.fetcher.fetch(query).await?)
    }

    /// Fetches `query` and reshapes the first location into hourly and daily frames.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::WeatherData`] wrapping
    /// [`crate::WeatherDataError::NoLocationResults`] when the API answers with an
    /// empty list, or any fetch or reshaping error.
    pub async fn tables(&self, query: &ArchiveQuery) -> Result<WeatherTables, ArchiveError> {
        let response = first_location(self.fetch(query).await?)?;
        Ok(WeatherTables::from_response(&response)?)
    }

    /// Fetches hourly and daily frames for one point and date range.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The coordinate to read.
    /// * `.start(NaiveDate)`: **Required.** First day, inclusive.
    /// * `.end(NaiveDate)`: **Required.** Last day, inclusive.
    /// * `.hourly(Vec<String>)`: Optional. Hourly variables. Defaults to `temperature_2m`, `rain`, `wind_speed_10m`.
    /// * `.daily(Vec<String>)`: Optional. Daily variables. Defaults to `temperature_2m_max`, `temperature_2m_min`, `wind_speed_10m_max`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use meteo_archive::{ArchiveError, LatLon, OpenMeteoArchive};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ArchiveError> {
    /// let archive = OpenMeteoArchive::new().await?;
    /// let tables = archive
    ///     .from_location()
    ///     .location(LatLon(48.85, 2.35))
    ///     .start(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
    ///     .end(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap())
    ///     .call()
    ///     .await?;
    /// assert_eq!(tables.daily.height(), 7);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn from_location(
        &self,
        location: LatLon,
        start: NaiveDate,
        end: NaiveDate,
        hourly: Option<Vec<String>>,
        daily: Option<Vec<String>>,
    ) -> Result<WeatherTables, ArchiveError> {
        let query = ArchiveQuery::builder()
            .location(location)
            .start_date(start)
            .end_date(end)
            .maybe_hourly(hourly)
            .maybe_daily(daily)
            .build();
        self.tables(&query).await
    }
}
