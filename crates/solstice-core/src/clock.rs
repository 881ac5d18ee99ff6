//! Wall-clock access and civil calendar conversion.
//!
//! The face needs a date and a time of day, not a timezone database: the
//! platform shell supplies epoch seconds plus a UTC offset, and everything
//! else is pure arithmetic that runs the same on hardware and on the host.

use core::fmt::Write;

use heapless::String;

const SECS_PER_DAY: i64 = 86_400;

/// Source of the current wall-clock time.
///
/// The simulator implements this over the host clock; tests pin a fixed
/// instant so formatting is deterministic.
pub trait Clock {
    /// Seconds since the Unix epoch, UTC.
    fn epoch_secs(&self) -> i64;

    /// Offset from UTC applied before formatting, in seconds.
    fn utc_offset_secs(&self) -> i32;
}

/// Day of week, derived from the epoch day number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    fn from_epoch_days(days: i64) -> Self {
        // Day 0 (1970-01-01) was a Thursday.
        const TABLE: [Weekday; 7] = [
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
        ];
        TABLE[(days + 4).rem_euclid(7) as usize]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunday => "SUN",
            Self::Monday => "MON",
            Self::Tuesday => "TUE",
            Self::Wednesday => "WED",
            Self::Thursday => "THU",
            Self::Friday => "FRI",
            Self::Saturday => "SAT",
        }
    }
}

/// A broken-down local date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub weekday: Weekday,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CivilDateTime {
    /// Converts epoch seconds plus a UTC offset to local civil time.
    pub fn from_epoch(epoch_secs: i64, utc_offset_secs: i32) -> Self {
        let local = epoch_secs + i64::from(utc_offset_secs);
        let days = local.div_euclid(SECS_PER_DAY);
        let secs = local.rem_euclid(SECS_PER_DAY);

        let (year, month, day) = civil_from_days(days);

        Self {
            year,
            month,
            day,
            weekday: Weekday::from_epoch_days(days),
            hour: (secs / 3_600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    /// Hour text with trailing colon, e.g. `"07:"`.
    ///
    /// Zero-based 12-hour clock: midnight and noon render as `"00:"`.
    pub fn hour_text(&self) -> String<4> {
        let mut out = String::new();
        write!(out, "{:02}:", self.hour % 12).ok();
        out
    }

    /// Zero-padded minute text, e.g. `"05"`.
    pub fn minute_text(&self) -> String<4> {
        let mut out = String::new();
        write!(out, "{:02}", self.minute).ok();
        out
    }

    /// Uppercase date line, e.g. `"FRI, JUL 14 2017"`.
    pub fn date_text(&self) -> String<24> {
        let mut out = String::new();
        write!(
            out,
            "{}, {} {} {}",
            self.weekday.label(),
            month_label(self.month),
            self.day,
            self.year
        )
        .ok();
        out
    }
}

/// Converts a day count since 1970-01-01 to (year, month, day) in the
/// proleptic Gregorian calendar. Days may be negative.
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    // Shift epoch from 1970-01-01 to 0000-03-01 so leap days land at the
    // end of the 400-year era.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year as i32, month as u8, day as u8)
}

fn month_label(month: u8) -> &'static str {
    const TABLE: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    TABLE[(month as usize - 1).min(11)]
}
