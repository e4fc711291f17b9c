//! Calendar values: [`Date`], [`Time`] and [`DateTime`].
//!
//! Haystack dates are Gregorian with a four-digit year no earlier than 1900.
//! Arithmetic and weekday computations delegate to `chrono`; the types here
//! keep the plain field layout the Zinc and JSON encodings work with.
//!
//! ```rust
//! use serde_haystack::Date;
//!
//! let leap = Date::new(2024, 2, 28).unwrap();
//! assert_eq!(leap.plus_days(1), Date::new(2024, 2, 29).unwrap());
//!
//! let common = Date::new(2023, 2, 28).unwrap();
//! assert_eq!(common.plus_days(1), Date::new(2023, 3, 1).unwrap());
//! ```

use crate::{Error, Result, TimeZone};
use chrono::{Datelike, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt;

/// A calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: i32,
    month: u32,
    day: u32,
}

impl Date {
    /// Creates a date, validating the calendar fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the year is before 1900, the
    /// month is outside `1..=12`, or the day does not exist in that month.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Date;
    ///
    /// assert!(Date::new(2024, 2, 29).is_ok());
    /// assert!(Date::new(2023, 2, 29).is_err());
    /// assert!(Date::new(1899, 12, 31).is_err());
    /// ```
    pub fn new(year: i32, month: u32, day: u32) -> Result<Date> {
        if year < 1900 {
            return Err(Error::invalid(format!("Invalid year: {}", year)));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::invalid(format!("Invalid month: {}", month)));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(Error::invalid(format!(
                "Invalid day {} for {}-{:02}",
                day, year, month
            )));
        }
        Ok(Date { year, month, day })
    }

    /// Today's date in the given timezone (standard offset).
    #[must_use]
    pub fn today(tz: TimeZone) -> Date {
        DateTime::now(tz).date()
    }

    #[inline]
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    #[inline]
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Returns the date `days` days after this one; negative values go back.
    ///
    /// Results earlier than 1900 are clamped to `1900-01-01`.
    #[must_use]
    pub fn plus_days(&self, days: i64) -> Date {
        let shifted = chrono::Duration::try_days(days)
            .and_then(|delta| self.naive().checked_add_signed(delta))
            .filter(|d| d.year() >= 1900);
        match shifted {
            Some(d) => Date::from_naive(d),
            None if days < 0 => Date {
                year: 1900,
                month: 1,
                day: 1,
            },
            None => *self,
        }
    }

    /// Returns the date `days` days before this one.
    #[must_use]
    pub fn minus_days(&self, days: i64) -> Date {
        self.plus_days(-days)
    }

    /// Day of week, 0 = Sunday through 6 = Saturday.
    #[must_use]
    pub fn weekday(&self) -> u32 {
        self.naive().weekday().num_days_from_sunday()
    }

    /// Day of year, 1-based.
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.naive().ordinal()
    }

    #[must_use]
    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year)
    }

    /// Midnight at the start of this date in the given timezone.
    #[must_use]
    pub fn midnight(&self, tz: TimeZone) -> DateTime {
        DateTime {
            date: *self,
            time: Time::MIDNIGHT,
            tz,
            tz_offset: tz.std_offset(),
        }
    }

    fn naive(&self) -> NaiveDate {
        // fields are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).unwrap_or(NaiveDate::MIN)
    }

    fn from_naive(d: NaiveDate) -> Date {
        Date {
            year: d.year(),
            month: d.month(),
            day: d.day(),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Returns `true` if `year` is a Gregorian leap year.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month (1-based), or 0 for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A time of day with millisecond precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time {
    hour: u32,
    min: u32,
    sec: u32,
    ms: u32,
}

impl Time {
    /// `00:00:00`
    pub const MIDNIGHT: Time = Time {
        hour: 0,
        min: 0,
        sec: 0,
        ms: 0,
    };

    /// Creates a time, validating each field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an hour above 23, minute or
    /// second above 59, or millisecond above 999.
    pub fn new(hour: u32, min: u32, sec: u32, ms: u32) -> Result<Time> {
        if hour > 23 {
            return Err(Error::invalid(format!("Invalid hour: {}", hour)));
        }
        if min > 59 {
            return Err(Error::invalid(format!("Invalid minute: {}", min)));
        }
        if sec > 59 {
            return Err(Error::invalid(format!("Invalid second: {}", sec)));
        }
        if ms > 999 {
            return Err(Error::invalid(format!("Invalid millisecond: {}", ms)));
        }
        Ok(Time { hour, min, sec, ms })
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    #[inline]
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    #[inline]
    #[must_use]
    pub const fn sec(&self) -> u32 {
        self.sec
    }

    #[inline]
    #[must_use]
    pub const fn ms(&self) -> u32 {
        self.ms
    }

    /// Milliseconds since midnight.
    #[must_use]
    pub const fn millis_of_day(&self) -> u32 {
        ((self.hour * 60 + self.min) * 60 + self.sec) * 1000 + self.ms
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.min, self.sec)?;
        if self.ms != 0 {
            write!(f, ".{:03}", self.ms)?;
        }
        Ok(())
    }
}

/// A timestamp: local date and time plus the UTC offset and timezone it was
/// recorded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTime {
    date: Date,
    time: Time,
    tz: TimeZone,
    tz_offset: i32,
}

impl DateTime {
    /// Creates a timestamp from its parts. `tz_offset` is in seconds east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the offset is beyond ±18 hours
    /// or is not a whole number of minutes.
    pub fn new(date: Date, time: Time, tz: TimeZone, tz_offset: i32) -> Result<DateTime> {
        if tz_offset.abs() > 18 * 3600 || tz_offset % 60 != 0 {
            return Err(Error::invalid(format!(
                "Invalid timezone offset: {}",
                tz_offset
            )));
        }
        Ok(DateTime {
            date,
            time,
            tz,
            tz_offset,
        })
    }

    /// Creates a timestamp from milliseconds since the Unix epoch, using the
    /// timezone's standard offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the instant falls before 1900.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{DateTime, TimeZone};
    ///
    /// let ts = DateTime::from_millis(1_700_000_000_000, TimeZone::utc()).unwrap();
    /// assert_eq!(ts.to_string(), "2023-11-14T22:13:20Z UTC");
    /// assert_eq!(ts.millis(), 1_700_000_000_000);
    /// ```
    pub fn from_millis(millis: i64, tz: TimeZone) -> Result<DateTime> {
        let offset = tz.std_offset();
        let local = chrono::DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|utc| utc.naive_utc() + chrono::Duration::seconds(offset as i64))
            .ok_or_else(|| Error::invalid(format!("Invalid millis: {}", millis)))?;
        let date = Date::new(local.year(), local.month(), local.day())?;
        let time = Time::new(
            chrono::Timelike::hour(&local),
            chrono::Timelike::minute(&local),
            chrono::Timelike::second(&local),
            local.and_utc().timestamp_subsec_millis(),
        )?;
        DateTime::new(date, time, tz, offset)
    }

    /// The current instant in the given timezone.
    #[must_use]
    pub fn now(tz: TimeZone) -> DateTime {
        let millis = Utc::now().timestamp_millis();
        DateTime::from_millis(millis, tz).unwrap_or(DateTime {
            date: Date {
                year: 1900,
                month: 1,
                day: 1,
            },
            time: Time::MIDNIGHT,
            tz,
            tz_offset: 0,
        })
    }

    #[inline]
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    #[inline]
    #[must_use]
    pub const fn time(&self) -> Time {
        self.time
    }

    #[inline]
    #[must_use]
    pub const fn tz(&self) -> TimeZone {
        self.tz
    }

    /// Offset from UTC in seconds.
    #[inline]
    #[must_use]
    pub const fn tz_offset(&self) -> i32 {
        self.tz_offset
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn millis(&self) -> i64 {
        let days = self
            .date
            .naive()
            .signed_duration_since(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN))
            .num_days();
        days * 86_400_000 + self.time.millis_of_day() as i64 - self.tz_offset as i64 * 1000
    }
}

impl DateTime {
    /// Orders two timestamps by the instant they denote, ignoring timezone.
    #[must_use]
    pub fn cmp_instant(&self, other: &DateTime) -> Ordering {
        self.millis().cmp(&other.millis())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)?;
        if self.tz_offset == 0 {
            f.write_str("Z")?;
        } else {
            let sign = if self.tz_offset < 0 { '-' } else { '+' };
            let abs = self.tz_offset.abs();
            write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)?;
        }
        write!(f, " {}", self.tz)
    }
}
