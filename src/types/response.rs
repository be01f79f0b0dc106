//! Typed view of an archive response.
//!
//! The JSON payload keys every variable array by name. Parsing resolves the
//! requested names in request order, so the rest of the crate addresses data by
//! name and never by position.

use crate::types::frequency::Frequency;
use crate::types::query::ArchiveQuery;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::reshape::generate_timestamps;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// One requested variable of a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionVariable {
    pub name: String,
    /// Unit reported by the API, e.g. `"°C"`.
    pub unit: Option<String>,
    /// One value per timestep; `None` where the archive has no observation.
    pub values: Vec<Option<f64>>,
}

/// The hourly or daily part of a response.
///
/// Rows cover the half-open range `[start, end)` stepped by `interval_secs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSection {
    pub frequency: Frequency,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval_secs: i64,
    /// In request order.
    pub variables: Vec<SectionVariable>,
}

impl ResponseSection {
    pub fn new(
        frequency: Frequency,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_secs: i64,
        variables: Vec<SectionVariable>,
    ) -> Self {
        Self {
            frequency,
            start,
            end,
            interval_secs,
            variables,
        }
    }

    /// Number of timesteps, `(end - start) / interval`.
    pub fn len(&self) -> usize {
        if self.interval_secs <= 0 {
            return 0;
        }
        let span = (self.end - self.start).num_seconds();
        usize::try_from(span / self.interval_secs).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn variable(&self, name: &str) -> Option<&SectionVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// The timestamp of every row.
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>, WeatherDataError> {
        generate_timestamps(self.start, self.end, self.interval_secs)
    }
}

/// The data returned for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResponse {
    /// Grid-cell latitude, which can differ slightly from the requested one.
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub generation_time_ms: Option<f64>,
    pub utc_offset_seconds: i32,
    pub timezone: Option<String>,
    pub hourly: Option<ResponseSection>,
    pub daily: Option<ResponseSection>,
}

impl LocationResponse {
    pub fn section(&self, frequency: Frequency) -> Option<&ResponseSection> {
        match frequency {
            Frequency::Hourly => self.hourly.as_ref(),
            Frequency::Daily => self.daily.as_ref(),
        }
    }

    pub fn require_section(&self, frequency: Frequency) -> Result<&ResponseSection, WeatherDataError> {
        self.section(frequency)
            .ok_or(WeatherDataError::MissingSection(frequency))
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct RawSection {
    time: Vec<i64>,
    #[serde(flatten)]
    values: HashMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    generationtime_ms: Option<f64>,
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    hourly: Option<RawSection>,
    #[serde(default)]
    hourly_units: Option<HashMap<String, String>>,
    #[serde(default)]
    daily: Option<RawSection>,
    #[serde(default)]
    daily_units: Option<HashMap<String, String>>,
}

/// A single location answers with an object, several with a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Many(Vec<RawLocation>),
    One(Box<RawLocation>),
}

/// Error body sent by the API alongside a 4xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: bool,
    pub reason: String,
}

/// Parses a response body into one [`LocationResponse`] per location.
pub(crate) fn parse_locations(
    body: &[u8],
    query: &ArchiveQuery,
) -> Result<Vec<LocationResponse>, WeatherDataError> {
    let raw_locations = match serde_json::from_slice::<RawPayload>(body)? {
        RawPayload::Many(locations) => locations,
        RawPayload::One(location) => vec![*location],
    };
    raw_locations
        .into_iter()
        .map(|raw| location_from_raw(raw, query))
        .collect()
}

fn location_from_raw(
    raw: RawLocation,
    query: &ArchiveQuery,
) -> Result<LocationResponse, WeatherDataError> {
    let hourly = raw
        .hourly
        .map(|section| {
            section_from_raw(
                Frequency::Hourly,
                section,
                raw.hourly_units.as_ref(),
                query.variables(Frequency::Hourly),
            )
        })
        .transpose()?;
    let daily = raw
        .daily
        .map(|section| {
            section_from_raw(
                Frequency::Daily,
                section,
                raw.daily_units.as_ref(),
                query.variables(Frequency::Daily),
            )
        })
        .transpose()?;

    Ok(LocationResponse {
        latitude: raw.latitude,
        longitude: raw.longitude,
        elevation: raw.elevation,
        generation_time_ms: raw.generationtime_ms,
        utc_offset_seconds: raw.utc_offset_seconds,
        timezone: raw.timezone,
        hourly,
        daily,
    })
}

fn section_from_raw(
    frequency: Frequency,
    mut raw: RawSection,
    units: Option<&HashMap<String, String>>,
    requested: &[String],
) -> Result<ResponseSection, WeatherDataError> {
    let steps = raw.time.len();
    let first = *raw
        .time
        .first()
        .ok_or(WeatherDataError::EmptySection(frequency))?;

    let last_time = raw.time.last().copied().unwrap_or(first);
    let interval_secs = match raw.time.get(1) {
        Some(second) => second
            .checked_sub(first)
            .ok_or(WeatherDataError::InvalidInterval {
                start: first,
                end: last_time,
                interval: 0,
            })?,
        None => frequency.nominal_interval_secs(),
    };
    let last = first.saturating_add(interval_secs.saturating_mul(i64::try_from(steps).unwrap_or(i64::MAX)));
    if interval_secs <= 0 {
        return Err(WeatherDataError::InvalidInterval {
            start: first,
            end: last,
            interval: interval_secs,
        });
    }
    if let Some(row) = raw
        .time
        .windows(2)
        .position(|pair| pair[1].checked_sub(pair[0]) != Some(interval_secs))
    {
        return Err(WeatherDataError::IrregularTimeAxis {
            frequency,
            row: row + 1,
        });
    }

    let invalid = || WeatherDataError::InvalidInterval {
        start: first,
        end: last,
        interval: interval_secs,
    };
    let start = DateTime::<Utc>::from_timestamp(first, 0).ok_or_else(invalid)?;
    let end = DateTime::<Utc>::from_timestamp(last, 0).ok_or_else(invalid)?;

    let variables = requested
        .iter()
        .map(|name| {
            let values = raw
                .values
                .remove(name)
                .ok_or_else(|| WeatherDataError::MissingVariable {
                    frequency,
                    name: name.clone(),
                })?;
            if values.len() != steps {
                return Err(WeatherDataError::LengthMismatch {
                    column: name.clone(),
                    expected: steps,
                    found: values.len(),
                });
            }
            Ok(SectionVariable {
                name: name.clone(),
                unit: units.and_then(|u| u.get(name).cloned()),
                values,
            })
        })
        .collect::<Result<Vec<_>, WeatherDataError>>()?;

    Ok(ResponseSection::new(frequency, start, end, interval_secs, variables))
}
