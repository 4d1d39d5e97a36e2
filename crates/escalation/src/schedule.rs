//! Schedule settings: notification time, working weekdays, timezone.
//!
//! Settings are read as a flat key/value map from the data store and
//! merged over compiled-in defaults. A missing or malformed key falls
//! back to its default; the merge never fails.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use serde::ser::SerializeStruct;
use tracing::warn;
use upkeep_core::UpkeepError;

pub const KEY_NOTIFICATION_TIME: &str = "notification_time";
pub const KEY_WORK_DAYS: &str = "work_days";
pub const KEY_TIMEZONE: &str = "timezone";

pub const DEFAULT_NOTIFICATION_TIME: &str = "08:00";
pub const DEFAULT_WORK_DAYS: &str = "1,2,3,4,5";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Bucharest;

/// Set of working weekdays, stored as a bitmask (bit 0 = Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkDays(u8);

impl WorkDays {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Monday through Friday.
    pub fn mon_to_fri() -> Self {
        Self(0b0001_1111)
    }

    pub fn with(mut self, day: Weekday) -> Self {
        self.0 |= 1 << day.num_days_from_monday();
        self
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// ISO weekday numbers (1 = Monday .. 7 = Sunday), ascending.
    pub fn iso_numbers(&self) -> Vec<u32> {
        (0..7u32).filter(|i| self.0 & (1 << i) != 0).map(|i| i + 1).collect()
    }
}

impl FromStr for WorkDays {
    type Err = UpkeepError;

    /// Parse a comma-separated list of single-digit weekday numbers. `1`..`6`
    /// are Monday..Saturday; both `0` and `7` mean Sunday. Whitespace around
    /// entries is allowed, empty entries are not. Same grammar as the
    /// `escalation_schedule` view.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = WorkDays::empty();
        for part in s.split(',').map(str::trim) {
            let day = match part {
                "0" | "7" => Weekday::Sun,
                "1" => Weekday::Mon,
                "2" => Weekday::Tue,
                "3" => Weekday::Wed,
                "4" => Weekday::Thu,
                "5" => Weekday::Fri,
                "6" => Weekday::Sat,
                _ => return Err(UpkeepError::InvalidWeekday(part.to_string())),
            };
            days = days.with(day);
        }
        Ok(days)
    }
}

impl std::fmt::Display for WorkDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iso_numbers().iter().map(u32::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

/// Effective schedule for one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Local time of day at which reminders go out. Only the hour gates.
    pub notification_time: NaiveTime,
    pub work_days: WorkDays,
    pub timezone: Tz,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            notification_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            work_days: WorkDays::mon_to_fri(),
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl ScheduleSettings {
    /// Merge store values over the defaults.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            notification_time: override_or(pairs, KEY_NOTIFICATION_TIME, defaults.notification_time, parse_time_of_day),
            work_days: override_or(pairs, KEY_WORK_DAYS, defaults.work_days, WorkDays::from_str),
            timezone: override_or(pairs, KEY_TIMEZONE, defaults.timezone, parse_timezone),
        }
    }

    pub fn notification_hour(&self) -> u32 {
        self.notification_time.hour()
    }

    /// `HH:MM` rendering of the notification time.
    pub fn notification_time_label(&self) -> String {
        self.notification_time.format("%H:%M").to_string()
    }
}

impl serde::Serialize for ScheduleSettings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScheduleSettings", 3)?;
        s.serialize_field("notificationTime", &self.notification_time_label())?;
        s.serialize_field("workDays", &self.work_days.iso_numbers())?;
        s.serialize_field("timezone", self.timezone.name())?;
        s.end()
    }
}

fn override_or<T, F>(pairs: &HashMap<String, String>, key: &str, default: T, parse: F) -> T
where
    F: Fn(&str) -> Result<T, UpkeepError>,
{
    match pairs.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => match parse(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = raw, error = %e, "invalid schedule setting, using default");
                default
            }
        },
    }
}

/// Parse `HH:MM` (seconds tolerated and ignored).
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, UpkeepError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map(|t| t.with_second(0).unwrap_or(t))
        .map_err(|_| UpkeepError::InvalidTimeOfDay(s.to_string()))
}

pub fn parse_timezone(s: &str) -> Result<Tz, UpkeepError> {
    s.parse::<Tz>()
        .map_err(|_| UpkeepError::UnknownTimezone(s.to_string()))
}
