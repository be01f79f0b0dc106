use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Anything that names a single instant, as the naive-UTC value stored in a frame's `date` column.
///
/// Naive values are taken to already be UTC; a bare date means its midnight.
pub trait IntoNaiveUtc {
    fn into_naive_utc(self) -> NaiveDateTime;
}

impl IntoNaiveUtc for NaiveDateTime {
    fn into_naive_utc(self) -> NaiveDateTime {
        self
    }
}

impl IntoNaiveUtc for NaiveDate {
    fn into_naive_utc(self) -> NaiveDateTime {
        self.and_time(NaiveTime::MIN)
    }
}

impl<Tz: TimeZone> IntoNaiveUtc for DateTime<Tz> {
    fn into_naive_utc(self) -> NaiveDateTime {
        self.naive_utc()
    }
}
