mod archive;
pub mod charts;
mod error;
mod types;
mod utils;
mod weather_data;

pub use archive::*;
pub use error::ArchiveError;

pub use types::frequency::*;
pub use types::query::{ArchiveQuery, LatLon};
pub use types::response::{LocationResponse, ResponseSection, SectionVariable};
pub use types::weather_tables::WeatherTables;

pub use types::frequency_frames::daily_frame::*;
pub use types::frequency_frames::hourly_frame::*;
pub use types::instant::IntoNaiveUtc;

pub use charts::{render_all, ChartError, ChartOutput, ChartSpec};
pub use utils::get_user_cache_dir;

pub use weather_data::error::WeatherDataError;
pub use weather_data::fetcher::{first_location, ArchiveFetcher, ARCHIVE_URL};
pub use weather_data::reshape::{generate_timestamps, section_to_dataframe, DATE_COLUMN};
pub use weather_data::response_cache::{CachedResponse, ResponseCache};
pub use weather_data::retry::RetryPolicy;
pub use weather_data::session::{CachedSession, SessionConfig, SessionResponse, DEFAULT_CACHE_DIR};
