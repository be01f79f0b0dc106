pub mod frequency;
pub mod frequency_frames;
pub mod instant;
pub mod query;
pub mod response;
pub mod weather_tables;
