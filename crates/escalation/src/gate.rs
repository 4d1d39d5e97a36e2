//! Run gate: business day + notification hour.
//!
//! The engine may be invoked more often than reminders should go out
//! (e.g. hourly). Only an invocation on a business day whose local hour
//! equals the configured notification hour does any work; minutes are
//! ignored, so the window is the whole hour.

use chrono::{DateTime, Timelike, Utc};

use crate::clock::BusinessDayClock;
use crate::schedule::ScheduleSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotBusinessDay,
    NotNotificationHour,
}

impl SkipReason {
    /// Stable reason code reported to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::NotBusinessDay => "not-business-day",
            SkipReason::NotNotificationHour => "not-notification-hour",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Open,
    Closed(SkipReason),
}

impl GateDecision {
    pub fn is_open(&self) -> bool {
        matches!(self, GateDecision::Open)
    }
}

/// Evaluate both gates for `now`. The day gate is checked first.
pub fn evaluate(clock: &BusinessDayClock, settings: &ScheduleSettings, now: DateTime<Utc>) -> GateDecision {
    if !clock.is_business_day(now, settings) {
        return GateDecision::Closed(SkipReason::NotBusinessDay);
    }
    if clock.local(now, settings).hour() != settings.notification_hour() {
        return GateDecision::Closed(SkipReason::NotNotificationHour);
    }
    GateDecision::Open
}
