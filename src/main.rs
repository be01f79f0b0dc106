//! Fetches the Berlin sample from the Open-Meteo archive and shows the three charts.

use log::{info, LevelFilter};
use meteo_archive::{render_all, ArchiveQuery, ChartOutput, OpenMeteoArchive};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .init();

    let archive = OpenMeteoArchive::new().await?;
    let query = ArchiveQuery::default();
    let tables = archive.tables(&query).await?;

    info!(
        "Received {} hourly and {} daily rows for ({}, {})",
        tables.hourly.height(),
        tables.daily.height(),
        tables.location.0,
        tables.location.1
    );
    println!("{}", tables.hourly.frame.head(Some(5)));
    println!("{}", tables.daily.frame.head(Some(5)));

    render_all(&tables, &ChartOutput::Display)?;
    Ok(())
}
