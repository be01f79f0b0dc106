//! Renders the exploratory charts of a [`WeatherTables`] with `plotlars`.
//!
//! Each chart picks the `date` column and one value column of a frame, turns
//! the timestamps into axis labels and draws the rows as they are. Nothing is
//! aggregated: every daily row becomes one bar.
//!
//! Charts use a dark-grid look: a grey plot area crossed by white grid lines.
//! plotlars has no plot-background setter, so the background is added to the
//! layout of the exported HTML.

use crate::types::frequency::Frequency;
use crate::types::frequency_frames::daily_frame::WIND_SPEED_MAX_COLUMN;
use crate::types::frequency_frames::hourly_frame::{RAIN_COLUMN, TEMPERATURE_COLUMN};
use crate::types::weather_tables::WeatherTables;
use crate::weather_data::reshape::DATE_COLUMN;
use log::{info, warn};
use plotlars::{Axis, BarPlot, Legend, Plot, Rgb, Text, TimeSeriesPlot};
use polars::prelude::{col, DataFrame, IntoLazy, PolarsError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column holding the formatted timestamps used as x-axis labels.
pub const LABEL_COLUMN: &str = "date_label";

const GRID_COLOR: (u8, u8, u8) = (255, 255, 255);
const PLOT_BACKGROUND: &str = "#EAEAF2";
const PLOT_CALL: &str = "Plotly.newPlot(";
const TICK_ANGLE: f64 = -45.0;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Cannot draw '{0}' from an empty frame")]
    EmptyFrame(&'static str),

    #[error("Chart '{chart}' needs column '{column}'")]
    MissingColumn {
        chart: &'static str,
        column: &'static str,
    },

    #[error("Failed preparing chart data: {0}")]
    Polars(#[from] PolarsError),

    #[error("Failed to create chart directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write chart file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to open chart '{0}' in a browser")]
    Browser(PathBuf, #[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    /// File stem used when writing HTML.
    pub slug: &'static str,
    pub kind: ChartKind,
    pub frequency: Frequency,
    pub value_column: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Legend entry; the value column is shown under this name.
    pub legend: Option<&'static str>,
    pub color: (u8, u8, u8),
    /// `strftime` format of the x-axis labels.
    pub label_format: &'static str,
}

pub const HOURLY_TEMPERATURE: ChartSpec = ChartSpec {
    slug: "hourly_temperature",
    kind: ChartKind::Line,
    frequency: Frequency::Hourly,
    value_column: TEMPERATURE_COLUMN,
    title: "Hourly Temperature Trend",
    x_label: "Date",
    y_label: "Temperature (°C)",
    legend: Some("Temperature (°C)"),
    color: (255, 0, 0),
    label_format: "%Y-%m-%d %H:%M",
};

pub const HOURLY_RAIN: ChartSpec = ChartSpec {
    slug: "hourly_rain",
    kind: ChartKind::Line,
    frequency: Frequency::Hourly,
    value_column: RAIN_COLUMN,
    title: "Hourly Rainfall Trend",
    x_label: "Date",
    y_label: "Rain (mm)",
    legend: Some("Rain (mm)"),
    color: (0, 0, 255),
    label_format: "%Y-%m-%d %H:%M",
};

pub const DAILY_MAX_WIND: ChartSpec = ChartSpec {
    slug: "daily_max_wind_speed",
    kind: ChartKind::Bar,
    frequency: Frequency::Daily,
    value_column: WIND_SPEED_MAX_COLUMN,
    title: "Daily Max Wind Speed",
    x_label: "Date",
    y_label: "Max Wind Speed (m/s)",
    legend: None,
    color: (128, 0, 128),
    label_format: "%Y-%m-%d",
};

/// The three charts drawn by [`render_all`], in display order.
pub const DEFAULT_CHARTS: [ChartSpec; 3] = [HOURLY_TEMPERATURE, HOURLY_RAIN, DAILY_MAX_WIND];

/// Where rendered charts go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChartOutput {
    /// Open each chart in the default browser.
    #[default]
    Display,
    /// Write `<slug>.html` files into the directory.
    HtmlDir(PathBuf),
}

impl ChartSpec {
    /// Name of the plotted value column in [`ChartSpec::chart_data`]'s output.
    pub fn series_name(&self) -> &'static str {
        self.legend.unwrap_or(self.value_column)
    }

    /// Selects the label and value columns the chart draws.
    ///
    /// # Errors
    ///
    /// [`ChartError::EmptyFrame`] for a frame without rows and
    /// [`ChartError::MissingColumn`] when `date` or the value column is absent.
    pub fn chart_data(&self, frame: &DataFrame) -> Result<DataFrame, ChartError> {
        if frame.height() == 0 {
            return Err(ChartError::EmptyFrame(self.title));
        }
        for column in [DATE_COLUMN, self.value_column] {
            if frame.column(column).is_err() {
                return Err(ChartError::MissingColumn {
                    chart: self.title,
                    column,
                });
            }
        }

        let data = frame
            .clone()
            .lazy()
            .select([
                col(DATE_COLUMN)
                    .dt()
                    .to_string(self.label_format)
                    .alias(LABEL_COLUMN),
                col(self.value_column).alias(self.series_name()),
            ])
            .collect()?;
        Ok(data)
    }

    fn frame<'a>(&self, tables: &'a WeatherTables) -> &'a DataFrame {
        match self.frequency {
            Frequency::Hourly => &tables.hourly.frame,
            Frequency::Daily => &tables.daily.frame,
        }
    }

    fn color(&self) -> Rgb {
        Rgb(self.color.0, self.color.1, self.color.2)
    }
}

fn x_axis() -> Axis {
    Axis::new()
        .tick_angle(TICK_ANGLE)
        .show_grid(true)
        .grid_color(Rgb(GRID_COLOR.0, GRID_COLOR.1, GRID_COLOR.2))
}

fn y_axis() -> Axis {
    Axis::new()
        .show_grid(true)
        .grid_color(Rgb(GRID_COLOR.0, GRID_COLOR.1, GRID_COLOR.2))
        .value_color(Rgb(0, 0, 0))
}

/// Sets the plot-area background in the layout passed to `Plotly.newPlot`.
///
/// The search starts at the last `Plotly.newPlot(` call because the page may
/// embed plotly.js itself. HTML without that call is returned unchanged.
fn with_dark_grid(html: &str) -> String {
    let layout_brace = html.rfind(PLOT_CALL).and_then(|call| {
        let layout = call + html[call..].find("\"layout\"")?;
        Some(layout + html[layout..].find('{')?)
    });
    match layout_brace {
        Some(brace) => format!(
            "{}\"plot_bgcolor\":\"{}\",{}",
            &html[..=brace],
            PLOT_BACKGROUND,
            &html[brace + 1..]
        ),
        None => {
            warn!("No plot layout found in chart HTML, keeping the default background");
            html.to_string()
        }
    }
}

fn write_chart(plot: &impl Plot, path: &Path) -> Result<(), ChartError> {
    std::fs::write(path, with_dark_grid(&plot.to_html()))
        .map_err(|e| ChartError::Write(path.to_path_buf(), e))
}

fn emit(plot: &impl Plot, spec: &ChartSpec, output: &ChartOutput) -> Result<(), ChartError> {
    match output {
        ChartOutput::Display => {
            let path = std::env::temp_dir().join(format!("meteo_archive_{}.html", spec.slug));
            write_chart(plot, &path)?;
            info!("Showing chart '{}' from {}", spec.title, path.display());
            let target = path.to_string_lossy().into_owned();
            webbrowser::open(&target).map_err(|e| ChartError::Browser(path, e))?;
        }
        ChartOutput::HtmlDir(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| ChartError::OutputDir(dir.clone(), e))?;
            let path = dir.join(format!("{}.html", spec.slug));
            info!("Writing chart '{}' to {}", spec.title, path.display());
            write_chart(plot, &path)?;
        }
    }
    Ok(())
}

/// Draws one chart from `frame`.
pub fn render(frame: &DataFrame, spec: &ChartSpec, output: &ChartOutput) -> Result<(), ChartError> {
    let data = spec.chart_data(frame)?;

    match spec.kind {
        ChartKind::Line => {
            let plot = TimeSeriesPlot::builder()
                .data(&data)
                .x(LABEL_COLUMN)
                .y(spec.series_name())
                .colors(vec![spec.color()])
                .plot_title(Text::from(spec.title).size(18))
                .legend(&Legend::new().x(0.05).y(0.95))
                .x_title(spec.x_label)
                .y_title(spec.y_label)
                .x_axis(&x_axis())
                .y_axis(&y_axis())
                .build();
            emit(&plot, spec, output)
        }
        ChartKind::Bar => {
            let plot = BarPlot::builder()
                .data(&data)
                .labels(LABEL_COLUMN)
                .values(spec.series_name())
                .colors(vec![spec.color()])
                .plot_title(Text::from(spec.title).size(18))
                .x_title(spec.x_label)
                .y_title(spec.y_label)
                .x_axis(&x_axis())
                .y_axis(&y_axis())
                .build();
            emit(&plot, spec, output)
        }
    }
}

/// Draws the hourly temperature, hourly rain and daily max wind charts, in that order.
pub fn render_all(tables: &WeatherTables, output: &ChartOutput) -> Result<(), ChartError> {
    for spec in DEFAULT_CHARTS.iter() {
        render(spec.frame(tables), spec, output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::frequency_frames::daily_frame::DailyFrame;
    use crate::types::frequency_frames::hourly_frame::HourlyFrame;
    use crate::types::query::LatLon;
    use crate::types::response::{ResponseSection, SectionVariable};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn daily_frame() -> DailyFrame {
        let start = Utc.with_ymd_and_hms(2025, 2, 16, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 18, 0, 0, 0).unwrap();
        let section = ResponseSection::new(
            Frequency::Daily,
            start,
            end,
            86_400,
            vec![SectionVariable {
                name: "wind_speed_10m_max".to_string(),
                unit: Some("km/h".to_string()),
                values: vec![Some(21.5), Some(30.2)],
            }],
        );
        DailyFrame::try_from_section(&section).unwrap()
    }

    fn hourly_frame() -> HourlyFrame {
        let start = Utc.with_ymd_and_hms(2025, 2, 16, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 16, 3, 0, 0).unwrap();
        let section = ResponseSection::new(
            Frequency::Hourly,
            start,
            end,
            3600,
            vec![
                SectionVariable {
                    name: "temperature_2m".to_string(),
                    unit: Some("°C".to_string()),
                    values: vec![Some(1.0), Some(2.0), Some(3.0)],
                },
                SectionVariable {
                    name: "rain".to_string(),
                    unit: Some("mm".to_string()),
                    values: vec![Some(0.0), None, Some(0.4)],
                },
            ],
        );
        HourlyFrame::try_from_section(&section).unwrap()
    }

    #[test]
    fn test_chart_data_labels_and_values() -> Result<(), Box<dyn std::error::Error>> {
        let data = HOURLY_TEMPERATURE.chart_data(&hourly_frame().frame)?;

        assert_eq!(data.width(), 2);
        let labels: Vec<Option<&str>> = data.column(LABEL_COLUMN)?.str()?.into_iter().collect();
        assert_eq!(
            labels,
            vec![
                Some("2025-02-16 00:00"),
                Some("2025-02-16 01:00"),
                Some("2025-02-16 02:00")
            ]
        );
        let values: Vec<Option<f64>> = data.column("Temperature (°C)")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
        Ok(())
    }

    #[test]
    fn test_chart_data_keeps_missing_values() -> Result<(), Box<dyn std::error::Error>> {
        let data = HOURLY_RAIN.chart_data(&hourly_frame().frame)?;
        assert_eq!(data.height(), 3);
        assert_eq!(data.column("Rain (mm)")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_chart_data_rejects_empty_frame() {
        let empty = hourly_frame().frame.head(Some(0));
        assert!(matches!(
            HOURLY_TEMPERATURE.chart_data(&empty),
            Err(ChartError::EmptyFrame("Hourly Temperature Trend"))
        ));
    }

    #[test]
    fn test_chart_data_rejects_missing_column() {
        assert!(matches!(
            DAILY_MAX_WIND.chart_data(&hourly_frame().frame),
            Err(ChartError::MissingColumn {
                column: "wind_speed_10m_max",
                ..
            })
        ));
    }

    #[test]
    fn test_default_chart_order() {
        let slugs: Vec<&str> = DEFAULT_CHARTS.iter().map(|spec| spec.slug).collect();
        assert_eq!(slugs, vec!["hourly_temperature", "hourly_rain", "daily_max_wind_speed"]);
        assert_eq!(DAILY_MAX_WIND.kind, ChartKind::Bar);
        assert_eq!(DAILY_MAX_WIND.series_name(), "wind_speed_10m_max");
    }

    #[test]
    fn test_with_dark_grid_sets_layout_background() {
        let html = r#"<script>var layout = {};</script>
<script>Plotly.newPlot(graph_div, {"data":[{"type":"bar"}],"layout":{"title":"x"}});</script>"#;
        let themed = with_dark_grid(html);
        assert!(themed.contains(r##""layout":{"plot_bgcolor":"#EAEAF2","title":"x"}"##));
        assert!(themed.starts_with("<script>var layout = {};</script>"));
    }

    #[test]
    fn test_with_dark_grid_without_plot_call_is_unchanged() {
        let html = "<html><body>no chart</body></html>";
        assert_eq!(with_dark_grid(html), html);
    }

    #[test]
    fn test_render_all_writes_html_files() -> Result<(), Box<dyn std::error::Error>> {
        let tables = WeatherTables {
            location: LatLon(52.52, 13.419998),
            hourly: hourly_frame(),
            daily: daily_frame(),
        };
        let root = tempdir()?;
        let dir = root.path().join("charts");

        render_all(&tables, &ChartOutput::HtmlDir(dir.clone()))?;

        let mut files: Vec<String> = std::fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<Result<_, _>>()?;
        files.sort();
        assert_eq!(
            files,
            vec![
                "daily_max_wind_speed.html",
                "hourly_rain.html",
                "hourly_temperature.html"
            ]
        );

        let wind = std::fs::read_to_string(dir.join("daily_max_wind_speed.html"))?;
        assert!(wind.contains(r#""type":"bar""#));
        assert!(wind.contains(r##""plot_bgcolor":"#EAEAF2""##));
        let temperature = std::fs::read_to_string(dir.join("hourly_temperature.html"))?;
        assert!(temperature.contains("Hourly Temperature Trend"));
        Ok(())
    }

    #[test]
    fn test_render_rejects_file_as_output_dir() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let file = root.path().join("occupied");
        std::fs::write(&file, b"occupied")?;
        let result = render(
            &hourly_frame().frame,
            &HOURLY_TEMPERATURE,
            &ChartOutput::HtmlDir(file.clone()),
        );
        assert!(matches!(result, Err(ChartError::OutputDir(ref p, _)) if *p == file));
        Ok(())
    }
}
