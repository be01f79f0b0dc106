use crate::types::query::ArchiveQuery;
use crate::types::response::{parse_locations, ApiErrorBody, LocationResponse};
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::session::CachedSession;
use log::{debug, info, warn};
use url::Url;

/// The Open-Meteo historical archive endpoint.
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Issues archive requests through a [`CachedSession`].
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    session: CachedSession,
    endpoint: Url,
}

impl ArchiveFetcher {
    pub fn new(session: CachedSession, endpoint: Url) -> Self {
        Self { session, endpoint }
    }

    pub fn session(&self) -> &CachedSession {
        &self.session
    }

    /// The full request URL for `query`. Identical queries give identical URLs.
    pub fn request_url(&self, query: &ArchiveQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(query.query_pairs());
        url
    }

    /// Fetches `query` and returns one response per location, in API order.
    pub async fn fetch(&self, query: &ArchiveQuery) -> Result<Vec<LocationResponse>, WeatherDataError> {
        let url = self.request_url(query);
        info!("Requesting archive data: {}", url);

        let response = self.session.get(&url).await?;
        if !response.status.is_success() {
            warn!("Archive request failed with {}", response.status);
            return Err(match serde_json::from_slice::<ApiErrorBody>(&response.body) {
                Ok(body) if body.error => WeatherDataError::Api {
                    status: response.status,
                    reason: body.reason,
                },
                _ => WeatherDataError::HttpStatus {
                    url: url.to_string(),
                    status: response.status,
                },
            });
        }

        let locations = parse_locations(&response.body, query)?;
        debug!(
            "Parsed {} location(s) from {} bytes (cached: {})",
            locations.len(),
            response.body.len(),
            response.from_cache
        );
        Ok(locations)
    }
}

/// Takes the first location of a fetch result.
///
/// # Errors
///
/// Returns [`WeatherDataError::NoLocationResults`] when the list is empty.
pub fn first_location(
    locations: Vec<LocationResponse>,
) -> Result<LocationResponse, WeatherDataError> {
    locations
        .into_iter()
        .next()
        .ok_or(WeatherDataError::NoLocationResults)
}
