// daily_frame.rs

//! Contains the `DailyFrame` structure holding reshaped daily archive data.

use crate::types::response::ResponseSection;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::reshape::{section_to_dataframe, DATE_COLUMN};
use chrono::{Days, NaiveDate};
use polars::prelude::{col, lit, Column, DataFrame, Expr, Float64Chunked, IntoLazy, PolarsResult};

pub const TEMPERATURE_MAX_COLUMN: &str = "temperature_2m_max";
pub const TEMPERATURE_MIN_COLUMN: &str = "temperature_2m_min";
pub const WIND_SPEED_MAX_COLUMN: &str = "wind_speed_10m_max";

/// A wrapper around a Polars `DataFrame` holding daily archive data.
///
/// One row per day; `date` is the UTC midnight that starts the day, stored
/// without a time zone. It is followed by the requested daily variables in
/// request order (`temperature_2m_max`, `temperature_2m_min`,
/// `wind_speed_10m_max` by default).
#[derive(Debug, Clone)]
pub struct DailyFrame {
    /// The underlying Polars DataFrame containing the daily data.
    pub frame: DataFrame,
}

impl DailyFrame {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Reshapes the daily section of a response.
    pub fn try_from_section(section: &ResponseSection) -> Result<Self, WeatherDataError> {
        Ok(Self::new(section_to_dataframe(section)?))
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// A single column by name, e.g. one of the requested variables.
    pub fn column(&self, name: &str) -> PolarsResult<&Column> {
        self.frame.column(name)
    }

    pub fn filter(&self, predicate: Expr) -> PolarsResult<DailyFrame> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(DailyFrame::new(frame))
    }

    /// Keeps the days from `start` through `end`, both inclusive.
    ///
    /// An `end` before `start` yields an empty frame.
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> PolarsResult<DailyFrame> {
        let from = start.and_time(chrono::NaiveTime::MIN);
        let until = end
            .checked_add_days(Days::new(1))
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN);
        self.filter(
            col(DATE_COLUMN)
                .gt_eq(lit(from))
                .and(col(DATE_COLUMN).lt(lit(until))),
        )
    }

    /// The row for a single day, if present.
    pub fn get_at(&self, date: NaiveDate) -> PolarsResult<DailyFrame> {
        self.get_range(date, date)
    }

    pub fn temperature_max(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(TEMPERATURE_MAX_COLUMN)?.f64()
    }

    pub fn temperature_min(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(TEMPERATURE_MIN_COLUMN)?.f64()
    }

    pub fn wind_speed_max(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(WIND_SPEED_MAX_COLUMN)?.f64()
    }
}
