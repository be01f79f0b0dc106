use crate::types::response::ResponseSection;
use crate::weather_data::error::WeatherDataError;
use chrono::{DateTime, Duration, Utc};
use polars::prelude::*;

/// Name of the timestamp column every frame starts with.
///
/// The column carries no time zone, but every value is a UTC instant: the
/// archive is queried with `timeformat=unixtime` and nothing is localized.
pub const DATE_COLUMN: &str = "date";

/// Generates the timestamps of `[start, end)` stepped by `interval_secs`.
///
/// The result holds exactly `(end - start) / interval_secs` values, none of them
/// at or after `end`. `end` must lie on the interval grid.
pub fn generate_timestamps(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval_secs: i64,
) -> Result<Vec<DateTime<Utc>>, WeatherDataError> {
    let span = (end - start).num_seconds();
    if interval_secs <= 0 || span < 0 || span % interval_secs != 0 {
        return Err(WeatherDataError::InvalidInterval {
            start: start.timestamp(),
            end: end.timestamp(),
            interval: interval_secs,
        });
    }
    Ok((0..span / interval_secs)
        .map(|step| start + Duration::seconds(step * interval_secs))
        .collect())
}

/// Builds a frame with a `date` column followed by the section's variables in order.
///
/// The `date` column is `Datetime(Milliseconds, None)`; read its values as UTC.
/// Any variable whose length differs from the time axis is rejected.
pub fn section_to_dataframe(section: &ResponseSection) -> Result<DataFrame, WeatherDataError> {
    let timestamps = section.timestamps()?;
    let expected = timestamps.len();

    let millis: Vec<i64> = timestamps.iter().map(|t| t.timestamp_millis()).collect();
    let dates = Series::new(DATE_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut columns: Vec<Column> = Vec::with_capacity(section.variables.len() + 1);
    columns.push(Column::from(dates));
    for variable in &section.variables {
        if variable.values.len() != expected {
            return Err(WeatherDataError::LengthMismatch {
                column: variable.name.clone(),
                expected,
                found: variable.values.len(),
            });
        }
        let series = Series::new(variable.name.as_str().into(), variable.values.as_slice());
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}
