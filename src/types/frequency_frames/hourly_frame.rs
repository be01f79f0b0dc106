// hourly_frame.rs

//! Contains the `HourlyFrame` structure holding reshaped hourly archive data.

use crate::types::instant::IntoNaiveUtc;
use crate::types::response::ResponseSection;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::reshape::{section_to_dataframe, DATE_COLUMN};
use polars::prelude::{col, lit, Column, DataFrame, Expr, Float64Chunked, IntoLazy, PolarsResult};

/// Column holding the air temperature at 2 m, in °C.
pub const TEMPERATURE_COLUMN: &str = "temperature_2m";
/// Column holding the hourly rain sum, in mm.
pub const RAIN_COLUMN: &str = "rain";
/// Column holding the wind speed at 10 m.
pub const WIND_SPEED_COLUMN: &str = "wind_speed_10m";

/// A wrapper around a Polars `DataFrame` holding hourly archive data.
///
/// The frame has one row per hour of the requested range. Its first column,
/// `date`, is a `Datetime(Milliseconds, None)`; callers must read its values
/// as UTC instants, and [`HourlyFrame::get_range`] converts zoned bounds to UTC
/// before comparing. The remaining columns are the requested hourly variables
/// in request order (`temperature_2m`, `rain`, `wind_speed_10m` by default).
///
/// Instances are typically obtained via [`crate::OpenMeteoArchive::tables`].
#[derive(Debug, Clone)]
pub struct HourlyFrame {
    /// The underlying Polars DataFrame containing the hourly data.
    pub frame: DataFrame,
}

impl HourlyFrame {
    /// Creates a new `HourlyFrame` wrapping the given `DataFrame`.
    ///
    /// # Arguments
    ///
    /// * `frame` - A `DataFrame` with a naive-UTC `date` column followed by hourly variables.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Reshapes the hourly section of a response.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherDataError::InvalidInterval`] if the section's time range is not
    /// a whole number of intervals, and [`WeatherDataError::LengthMismatch`] if any
    /// variable does not have one value per hour.
    pub fn try_from_section(section: &ResponseSection) -> Result<Self, WeatherDataError> {
        Ok(Self::new(section_to_dataframe(section)?))
    }

    /// Number of hourly rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// A single column by name, e.g. one of the requested variables.
    pub fn column(&self, name: &str) -> PolarsResult<&Column> {
        self.frame.column(name)
    }

    /// Filters the hourly data based on a Polars predicate expression.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use meteo_archive::{OpenMeteoArchive, ArchiveQuery};
    /// use polars::prelude::{col, lit};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let archive = OpenMeteoArchive::new().await?;
    /// let tables = archive.tables(&ArchiveQuery::default()).await?;
    ///
    /// let freezing = tables.hourly.filter(col("temperature_2m").lt(lit(0.0f64)))?;
    /// println!("Freezing hours:\n{}", freezing.frame);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> PolarsResult<HourlyFrame> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(HourlyFrame::new(frame))
    }

    /// Keeps the rows whose timestamp lies in `[start, end)`.
    pub fn get_range(
        &self,
        start: impl IntoNaiveUtc,
        end: impl IntoNaiveUtc,
    ) -> PolarsResult<HourlyFrame> {
        let start_naive = start.into_naive_utc();
        let end_naive = end.into_naive_utc();
        self.filter(
            col(DATE_COLUMN)
                .gt_eq(lit(start_naive))
                .and(col(DATE_COLUMN).lt(lit(end_naive))),
        )
    }

    pub fn temperature(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(TEMPERATURE_COLUMN)?.f64()
    }

    pub fn rain(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(RAIN_COLUMN)?.f64()
    }

    pub fn wind_speed(&self) -> PolarsResult<&Float64Chunked> {
        self.frame.column(WIND_SPEED_COLUMN)?.f64()
    }
}
