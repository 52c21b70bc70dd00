use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use tokio::task_local;

use super::Duration;

task_local! {
    pub static FIXED_NOW: DateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    delegate: chrono::DateTime<chrono::Local>,
}

impl DateTime {
    fn new<T: chrono::TimeZone>(delegate: chrono::DateTime<T>) -> Self {
        Self {
            delegate: delegate.with_timezone(&chrono::Local),
        }
    }

    pub fn now() -> Self {
        FIXED_NOW
            .try_with(|t| *t)
            .unwrap_or_else(|_| chrono::Local::now().into())
    }

    #[cfg(test)]
    pub fn from_iso(iso8601: &str) -> anyhow::Result<Self> {
        Ok(chrono::DateTime::parse_from_rfc3339(iso8601)?.into())
    }

    pub fn to_iso_string(&self) -> String {
        self.delegate.to_rfc3339()
    }

    /// First instant of the local calendar day this date-time falls on.
    pub fn start_of_day(&self) -> Self {
        let midnight = self.delegate.date_naive().and_time(chrono::NaiveTime::MIN);

        //midnight does not exist on DST-switch days in some zones, first valid hour of the day is used then
        (0..=2)
            .find_map(|hour| {
                (midnight + chrono::Duration::hours(hour))
                    .and_local_timezone(chrono::Local)
                    .earliest()
            })
            .map(Self::new)
            .unwrap_or(*self)
    }

    /// Same wall-clock time the given number of calendar months earlier, clamped to the end of shorter months.
    pub fn months_before(&self, months: u32) -> Self {
        let months = chrono::Months::new(months);

        self.delegate
            .checked_sub_months(months)
            .map(Self::new)
            .or_else(|| {
                self.delegate
                    .naive_utc()
                    .checked_sub_months(months)
                    .map(|dt| Self::new(dt.and_utc()))
            })
            .unwrap_or_else(|| Self::new(chrono::DateTime::<chrono::Utc>::MIN_UTC))
    }

    pub fn into_db(&self) -> chrono::DateTime<chrono::Local> {
        self.delegate
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.delegate)
    }
}

impl Add<Duration> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate + rhs.delegate)
    }
}

impl Sub<Duration> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate - rhs.delegate)
    }
}

impl<T: chrono::TimeZone> From<chrono::DateTime<T>> for DateTime {
    fn from(val: chrono::DateTime<T>) -> Self {
        DateTime::new(val)
    }
}
