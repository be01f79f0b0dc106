//! The request sent to the archive: where, when, and which variables.

use crate::types::frequency::Frequency;
use bon::Builder;
use chrono::NaiveDate;

const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 2, 16) {
    Some(date) => date,
    None => panic!("invalid default start date"),
};
const DEFAULT_END_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 3, 2) {
    Some(date) => date,
    None => panic!("invalid default end date"),
};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use meteo_archive::LatLon;
///
/// let berlin = LatLon(52.52, 13.41);
/// assert_eq!(berlin.0, 52.52); // Latitude
/// assert_eq!(berlin.1, 13.41); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    /// Central Berlin, the location charted by the `archive_charts` binary.
    pub const BERLIN: LatLon = LatLon(52.52, 13.41);
}

/// A historical archive request.
///
/// Variable names are sent in the order given here, and the resulting frames
/// keep that order for their value columns.
///
/// # Examples
///
/// ```
/// use meteo_archive::{ArchiveQuery, LatLon};
/// use chrono::NaiveDate;
///
/// let query = ArchiveQuery::builder()
///     .location(LatLon(48.85, 2.35))
///     .start_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
///     .end_date(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap())
///     .hourly(vec!["temperature_2m".to_string()])
///     .build();
///
/// assert_eq!(query.hourly, vec!["temperature_2m"]);
/// // Daily variables fall back to the defaults.
/// assert_eq!(query.daily.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ArchiveQuery {
    pub location: LatLon,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    #[builder(default = default_variable_names(Frequency::Hourly))]
    pub hourly: Vec<String>,
    #[builder(default = default_variable_names(Frequency::Daily))]
    pub daily: Vec<String>,
}

fn default_variable_names(frequency: Frequency) -> Vec<String> {
    frequency
        .default_variables()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for ArchiveQuery {
    /// Berlin, 2025-02-16 through 2025-03-02, with the default hourly and daily variables.
    fn default() -> Self {
        ArchiveQuery::builder()
            .location(LatLon::BERLIN)
            .start_date(DEFAULT_START_DATE)
            .end_date(DEFAULT_END_DATE)
            .build()
    }
}

impl ArchiveQuery {
    /// The requested variable names for one frequency.
    pub fn variables(&self, frequency: Frequency) -> &[String] {
        match frequency {
            Frequency::Hourly => &self.hourly,
            Frequency::Daily => &self.daily,
        }
    }

    /// Query parameters in the order they are put on the URL.
    ///
    /// The order is fixed so that identical queries always produce the same URL,
    /// which is what the response cache keys on.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.location.0.to_string()),
            ("longitude", self.location.1.to_string()),
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
        ];
        for frequency in [Frequency::Hourly, Frequency::Daily] {
            let names = self.variables(frequency);
            if !names.is_empty() {
                pairs.push((frequency.path_segment(), names.join(",")));
            }
        }
        pairs.push(("timeformat", "unixtime".to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_matches_berlin_sample() {
        let query = ArchiveQuery::default();
        assert_eq!(query.location, LatLon(52.52, 13.41));
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2025, 2, 16).unwrap());
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(query.hourly, vec!["temperature_2m", "rain", "wind_speed_10m"]);
        assert_eq!(
            query.daily,
            vec!["temperature_2m_max", "temperature_2m_min", "wind_speed_10m_max"]
        );
    }

    #[test]
    fn test_query_pairs_order_and_values() {
        let pairs = ArchiveQuery::default().query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["latitude", "longitude", "start_date", "end_date", "hourly", "daily", "timeformat"]
        );
        assert_eq!(pairs[0].1, "52.52");
        assert_eq!(pairs[1].1, "13.41");
        assert_eq!(pairs[2].1, "2025-02-16");
        assert_eq!(pairs[3].1, "2025-03-02");
        assert_eq!(pairs[4].1, "temperature_2m,rain,wind_speed_10m");
        assert_eq!(pairs[6].1, "unixtime");
    }

    #[test]
    fn test_query_pairs_skip_empty_variable_lists() {
        let query = ArchiveQuery::builder()
            .location(LatLon(0.0, 0.0))
            .start_date(DEFAULT_START_DATE)
            .end_date(DEFAULT_START_DATE)
            .daily(Vec::new())
            .build();
        let pairs = query.query_pairs();
        assert!(pairs.iter().any(|(k, _)| *k == "hourly"));
        assert!(!pairs.iter().any(|(k, _)| *k == "daily"));
    }
}
