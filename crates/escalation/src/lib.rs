//! Work order reminder escalation engine.
//!
//! One invocation of [`EscalationRunner`] loads the schedule settings,
//! checks the run gate (business day + notification hour), then walks the
//! due work orders: resolve recipients, dispatch pushes, append a ledger
//! record. Cross-run state lives only in the ledger and the due view, so
//! repeated invocations never re-send a `(work order, tier)` pair.

pub mod clock;
pub mod error;
pub mod gate;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod sources;

pub use clock::{BusinessCalendar, BusinessDayClock, WeekdayCalendar};
pub use error::EscalationError;
pub use gate::{GateDecision, SkipReason};
pub use report::{FailedResult, RunReport, SentResult, WorkOrderResult};
pub use runner::EscalationRunner;
pub use schedule::{ScheduleSettings, WorkDays};
pub use sources::{
    AppendOutcome, DueWorkOrderSource, RecipientResolver, ReminderLedger, SettingsStore, StoreError,
};
