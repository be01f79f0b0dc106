use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meteo_archive::{
    generate_timestamps, section_to_dataframe, Frequency, ResponseSection, SectionVariable,
};

fn year_of_hours() -> ResponseSection {
    let hours = 24 * 365;
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let variable = |name: &str| SectionVariable {
        name: name.to_string(),
        unit: None,
        values: (0..hours).map(|h| Some((h % 24) as f64 * 0.5)).collect(),
    };
    ResponseSection::new(
        Frequency::Hourly,
        start,
        start + Duration::hours(hours as i64),
        3600,
        vec![variable("temperature_2m"), variable("rain"), variable("wind_speed_10m")],
    )
}

fn bench_reshape(c: &mut Criterion) {
    let section = year_of_hours();
    c.bench_function("generate_timestamps", |b| {
        b.iter(|| generate_timestamps(black_box(section.start), black_box(section.end), 3600))
    });
    c.bench_function("section_to_dataframe", |b| {
        b.iter(|| section_to_dataframe(black_box(&section)))
    });
}

criterion_group!(benches, bench_reshape);
criterion_main!(benches);
