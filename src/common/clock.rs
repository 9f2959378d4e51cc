use std::sync::Mutex;

use time::{
    Date, Duration, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

/// `DD/MM/YYYY`, the date format shown to users and stored on records.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[day]/[month]/[year]");

/// Source of the current time for ids and display dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Reads the system clock, in the local offset when it can be determined.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Milliseconds since the Unix epoch, the base for record ids.
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Formats `at` as `DD/MM/YYYY`.
pub fn display_date(at: OffsetDateTime) -> String {
    at.format(DATE_FORMAT)
        .unwrap_or_else(|_| format!("{:02}/{:02}/{}", at.day(), u8::from(at.month()), at.year()))
}

/// Parses a `DD/MM/YYYY` date, rejecting days that do not exist.
pub fn parse_display_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), DATE_FORMAT).ok()
}
