//! Defines the sampling frequencies served by the Open-Meteo archive and the
//! defaults that belong to each of them.

use std::fmt;

/// The time granularity of a section of an archive response.
///
/// The archive answers a single request with up to two sections, one per
/// frequency, each with its own time axis and variable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// One value per hour, e.g. `temperature_2m`, `rain`.
    Hourly,
    /// One aggregated value per day, e.g. `temperature_2m_max`.
    Daily,
}

impl Frequency {
    /// The query parameter and JSON key used for this frequency.
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
        }
    }

    /// Nominal step between two rows, in seconds.
    ///
    /// Used when a section holds a single timestep and the spacing cannot be
    /// read from the time axis.
    pub fn nominal_interval_secs(&self) -> i64 {
        match self {
            Frequency::Hourly => 3_600,
            Frequency::Daily => 86_400,
        }
    }

    /// Variables requested when the caller does not name any.
    pub fn default_variables(&self) -> Vec<&'static str> {
        match self {
            Frequency::Hourly => vec!["temperature_2m", "rain", "wind_speed_10m"],
            Frequency::Daily => vec![
                "temperature_2m_max",
                "temperature_2m_min",
                "wind_speed_10m_max",
            ],
        }
    }
}

/// Formats a `Frequency` using its `path_segment`.
///
/// # Examples
///
/// ```
/// use meteo_archive::Frequency;
///
/// assert_eq!(format!("{}", Frequency::Hourly), "hourly");
/// assert_eq!(Frequency::Daily.to_string(), "daily");
/// ```
impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
