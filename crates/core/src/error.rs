use thiserror::Error;

/// Errors raised when parsing domain values at the data-store boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpkeepError {
    #[error("Unknown escalation tier: {0}")]
    UnknownTier(String),

    #[error("Unknown work order priority: {0}")]
    UnknownPriority(String),

    #[error("Unknown user role: {0}")]
    UnknownRole(String),

    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid weekday '{0}': expected 0-7 (0 and 7 are Sunday)")]
    InvalidWeekday(String),
}
