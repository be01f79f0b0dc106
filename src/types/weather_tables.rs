use crate::types::frequency::Frequency;
use crate::types::frequency_frames::daily_frame::DailyFrame;
use crate::types::frequency_frames::hourly_frame::HourlyFrame;
use crate::types::query::LatLon;
use crate::types::response::LocationResponse;
use crate::weather_data::error::WeatherDataError;

/// The hourly and daily frames reshaped from one location's response.
#[derive(Debug, Clone)]
pub struct WeatherTables {
    /// Grid-cell coordinate the archive answered for.
    pub location: LatLon,
    pub hourly: HourlyFrame,
    pub daily: DailyFrame,
}

impl WeatherTables {
    /// Reshapes both sections of `response`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherDataError::MissingSection`] when the response lacks the hourly
    /// or daily section, or any reshaping error from the frames.
    pub fn from_response(response: &LocationResponse) -> Result<Self, WeatherDataError> {
        let hourly = HourlyFrame::try_from_section(response.require_section(Frequency::Hourly)?)?;
        let daily = DailyFrame::try_from_section(response.require_section(Frequency::Daily)?)?;
        Ok(Self {
            location: LatLon(response.latitude, response.longitude),
            hourly,
            daily,
        })
    }
}
