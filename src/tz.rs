//! Haystack timezone names.
//!
//! Haystack identifies a timezone by the city part of its IANA name
//! (`New_York` for `America/New_York`, `UTC` for `Etc/UTC`). This module maps
//! those names onto a built-in table. Each entry carries the zone's standard
//! UTC offset, which is used when a [`DateTime`](crate::DateTime) has to be
//! derived from an instant; values read from Zinc or JSON always carry their
//! own explicit offset. Daylight-saving rules are not modelled.
//!
//! ```rust
//! use serde_haystack::TimeZone;
//!
//! let tz = TimeZone::make("New_York").unwrap();
//! assert_eq!(tz.iana(), "America/New_York");
//! assert_eq!(TimeZone::make("America/New_York").unwrap(), tz);
//! assert!(TimeZone::make("Atlantis").is_err());
//! ```

use crate::{Error, Result};
use std::fmt;

struct TzEntry {
    name: &'static str,
    iana: &'static str,
    std_offset: i32,
}

macro_rules! tz_table {
    ($(($name:literal, $iana:literal, $hours:expr)),* $(,)?) => {
        &[$(TzEntry { name: $name, iana: $iana, std_offset: (($hours) * 3600.0) as i32 }),*]
    };
}

static ZONES: &[TzEntry] = tz_table![
    ("UTC", "Etc/UTC", 0.0),
    ("GMT", "Etc/GMT", 0.0),
    ("Rel", "Etc/Rel", 0.0),
    ("GMT+1", "Etc/GMT+1", -1.0),
    ("GMT+2", "Etc/GMT+2", -2.0),
    ("GMT+3", "Etc/GMT+3", -3.0),
    ("GMT+4", "Etc/GMT+4", -4.0),
    ("GMT+5", "Etc/GMT+5", -5.0),
    ("GMT+6", "Etc/GMT+6", -6.0),
    ("GMT+7", "Etc/GMT+7", -7.0),
    ("GMT+8", "Etc/GMT+8", -8.0),
    ("GMT+9", "Etc/GMT+9", -9.0),
    ("GMT+10", "Etc/GMT+10", -10.0),
    ("GMT+11", "Etc/GMT+11", -11.0),
    ("GMT+12", "Etc/GMT+12", -12.0),
    ("GMT-1", "Etc/GMT-1", 1.0),
    ("GMT-2", "Etc/GMT-2", 2.0),
    ("GMT-3", "Etc/GMT-3", 3.0),
    ("GMT-4", "Etc/GMT-4", 4.0),
    ("GMT-5", "Etc/GMT-5", 5.0),
    ("GMT-6", "Etc/GMT-6", 6.0),
    ("GMT-7", "Etc/GMT-7", 7.0),
    ("GMT-8", "Etc/GMT-8", 8.0),
    ("GMT-9", "Etc/GMT-9", 9.0),
    ("GMT-10", "Etc/GMT-10", 10.0),
    ("GMT-11", "Etc/GMT-11", 11.0),
    ("GMT-12", "Etc/GMT-12", 12.0),
    ("GMT-13", "Etc/GMT-13", 13.0),
    ("GMT-14", "Etc/GMT-14", 14.0),
    // Americas
    ("New_York", "America/New_York", -5.0),
    ("Detroit", "America/Detroit", -5.0),
    ("Toronto", "America/Toronto", -5.0),
    ("Montreal", "America/Montreal", -5.0),
    ("Chicago", "America/Chicago", -6.0),
    ("Winnipeg", "America/Winnipeg", -6.0),
    ("Mexico_City", "America/Mexico_City", -6.0),
    ("Denver", "America/Denver", -7.0),
    ("Phoenix", "America/Phoenix", -7.0),
    ("Edmonton", "America/Edmonton", -7.0),
    ("Los_Angeles", "America/Los_Angeles", -8.0),
    ("Vancouver", "America/Vancouver", -8.0),
    ("Anchorage", "America/Anchorage", -9.0),
    ("Honolulu", "Pacific/Honolulu", -10.0),
    ("Halifax", "America/Halifax", -4.0),
    ("St_Johns", "America/St_Johns", -3.5),
    ("Bogota", "America/Bogota", -5.0),
    ("Lima", "America/Lima", -5.0),
    ("Caracas", "America/Caracas", -4.0),
    ("Santiago", "America/Santiago", -4.0),
    ("Sao_Paulo", "America/Sao_Paulo", -3.0),
    ("Buenos_Aires", "America/Argentina/Buenos_Aires", -3.0),
    // Europe and Africa
    ("London", "Europe/London", 0.0),
    ("Dublin", "Europe/Dublin", 0.0),
    ("Lisbon", "Europe/Lisbon", 0.0),
    ("Paris", "Europe/Paris", 1.0),
    ("Berlin", "Europe/Berlin", 1.0),
    ("Amsterdam", "Europe/Amsterdam", 1.0),
    ("Brussels", "Europe/Brussels", 1.0),
    ("Madrid", "Europe/Madrid", 1.0),
    ("Rome", "Europe/Rome", 1.0),
    ("Zurich", "Europe/Zurich", 1.0),
    ("Vienna", "Europe/Vienna", 1.0),
    ("Stockholm", "Europe/Stockholm", 1.0),
    ("Oslo", "Europe/Oslo", 1.0),
    ("Copenhagen", "Europe/Copenhagen", 1.0),
    ("Warsaw", "Europe/Warsaw", 1.0),
    ("Prague", "Europe/Prague", 1.0),
    ("Athens", "Europe/Athens", 2.0),
    ("Helsinki", "Europe/Helsinki", 2.0),
    ("Kiev", "Europe/Kiev", 2.0),
    ("Istanbul", "Europe/Istanbul", 3.0),
    ("Moscow", "Europe/Moscow", 3.0),
    ("Cairo", "Africa/Cairo", 2.0),
    ("Johannesburg", "Africa/Johannesburg", 2.0),
    ("Lagos", "Africa/Lagos", 1.0),
    ("Nairobi", "Africa/Nairobi", 3.0),
    // Asia and Oceania
    ("Dubai", "Asia/Dubai", 4.0),
    ("Karachi", "Asia/Karachi", 5.0),
    ("Kolkata", "Asia/Kolkata", 5.5),
    ("Calcutta", "Asia/Calcutta", 5.5),
    ("Kathmandu", "Asia/Kathmandu", 5.75),
    ("Dhaka", "Asia/Dhaka", 6.0),
    ("Bangkok", "Asia/Bangkok", 7.0),
    ("Jakarta", "Asia/Jakarta", 7.0),
    ("Singapore", "Asia/Singapore", 8.0),
    ("Hong_Kong", "Asia/Hong_Kong", 8.0),
    ("Shanghai", "Asia/Shanghai", 8.0),
    ("Taipei", "Asia/Taipei", 8.0),
    ("Manila", "Asia/Manila", 8.0),
    ("Perth", "Australia/Perth", 8.0),
    ("Seoul", "Asia/Seoul", 9.0),
    ("Tokyo", "Asia/Tokyo", 9.0),
    ("Adelaide", "Australia/Adelaide", 9.5),
    ("Darwin", "Australia/Darwin", 9.5),
    ("Brisbane", "Australia/Brisbane", 10.0),
    ("Sydney", "Australia/Sydney", 10.0),
    ("Melbourne", "Australia/Melbourne", 10.0),
    ("Hobart", "Australia/Hobart", 10.0),
    ("Auckland", "Pacific/Auckland", 12.0),
];

/// A timezone resolved from the built-in Haystack name table.
///
/// Instances are cheap `Copy` handles onto a static entry, so two timezones are
/// equal exactly when they name the same zone.
#[derive(Clone, Copy)]
pub struct TimeZone(&'static TzEntry);

impl TimeZone {
    /// Looks up a timezone by Haystack city name or full IANA name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the name is not in the table.
    pub fn make(name: &str) -> Result<TimeZone> {
        Self::find(name).ok_or_else(|| Error::invalid(format!("Unknown timezone: {}", name)))
    }

    /// Unchecked variant of [`TimeZone::make`].
    #[must_use]
    pub fn find(name: &str) -> Option<TimeZone> {
        ZONES
            .iter()
            .find(|z| z.name == name || z.iana == name)
            .map(TimeZone)
    }

    /// The UTC timezone.
    #[must_use]
    pub fn utc() -> TimeZone {
        TimeZone(&ZONES[0])
    }

    /// Haystack name, such as `New_York`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// Full IANA name, such as `America/New_York`.
    #[inline]
    #[must_use]
    pub fn iana(&self) -> &'static str {
        self.0.iana
    }

    /// Standard (non-daylight) offset from UTC in seconds.
    #[inline]
    #[must_use]
    pub fn std_offset(&self) -> i32 {
        self.0.std_offset
    }

    #[inline]
    #[must_use]
    pub fn is_utc(&self) -> bool {
        self.0.name == "UTC"
    }
}

impl PartialEq for TimeZone {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for TimeZone {}

impl fmt::Debug for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeZone({})", self.0.name)
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

/// Returns `true` for characters allowed in a timezone name.
pub(crate) fn is_tz_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '+'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_city_and_iana() {
        let tz = TimeZone::make("Chicago").unwrap();
        assert_eq!(tz.name(), "Chicago");
        assert_eq!(tz.std_offset(), -6 * 3600);
        assert_eq!(TimeZone::make("America/Chicago").unwrap(), tz);
    }

    #[test]
    fn test_etc_offsets_are_inverted() {
        assert_eq!(TimeZone::make("GMT+5").unwrap().std_offset(), -5 * 3600);
        assert_eq!(TimeZone::make("GMT-14").unwrap().std_offset(), 14 * 3600);
    }

    #[test]
    fn test_fractional_offsets() {
        assert_eq!(TimeZone::make("Kolkata").unwrap().std_offset(), 19800);
        assert_eq!(TimeZone::make("Kathmandu").unwrap().std_offset(), 20700);
    }

    #[test]
    fn test_unknown_name() {
        assert!(TimeZone::find("Nowhere").is_none());
        assert!(matches!(
            TimeZone::make("Nowhere"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_utc() {
        assert!(TimeZone::utc().is_utc());
        assert_eq!(TimeZone::utc().to_string(), "UTC");
    }
}
