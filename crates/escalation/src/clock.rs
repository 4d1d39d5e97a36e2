//! Business-day arithmetic in the configured timezone.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::schedule::ScheduleSettings;

/// Decides whether a local calendar date is a business day.
///
/// The default [`WeekdayCalendar`] only looks at the weekday. A holiday
/// calendar can wrap it without touching the runner.
pub trait BusinessCalendar: Send + Sync {
    fn is_business_day(&self, date: NaiveDate, settings: &ScheduleSettings) -> bool;
}

/// Weekday-only calendar: no holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_day(&self, date: NaiveDate, settings: &ScheduleSettings) -> bool {
        settings.work_days.contains(date.weekday())
    }
}

#[derive(Clone)]
pub struct BusinessDayClock {
    calendar: Arc<dyn BusinessCalendar>,
}

impl BusinessDayClock {
    pub fn new(calendar: Arc<dyn BusinessCalendar>) -> Self {
        Self { calendar }
    }

    /// Clock backed by [`WeekdayCalendar`].
    pub fn weekdays() -> Self {
        Self::new(Arc::new(WeekdayCalendar))
    }

    /// `instant` expressed in the configured timezone.
    pub fn local(&self, instant: DateTime<Utc>, settings: &ScheduleSettings) -> DateTime<Tz> {
        instant.with_timezone(&settings.timezone)
    }

    pub fn is_business_day(&self, instant: DateTime<Utc>, settings: &ScheduleSettings) -> bool {
        let date = self.local(instant, settings).date_naive();
        self.calendar.is_business_day(date, settings)
    }

    /// Count local calendar days in `[start, end)` that are business days.
    pub fn business_days_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        settings: &ScheduleSettings,
    ) -> u32 {
        let mut day = self.local(start, settings).date_naive();
        let last = self.local(end, settings).date_naive();
        let mut count = 0;
        while day < last {
            if self.calendar.is_business_day(day, settings) {
                count += 1;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        count
    }
}

impl Default for BusinessDayClock {
    fn default() -> Self {
        Self::weekdays()
    }
}

impl std::fmt::Debug for BusinessDayClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessDayClock").finish_non_exhaustive()
    }
}
