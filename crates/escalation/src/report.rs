//! Aggregate result of one run, serialized as the trigger response.

use serde::Serialize;
use upkeep_core::EscalationTier;
use uuid::Uuid;

use crate::error::EscalationError;
use crate::gate::SkipReason;
use crate::schedule::ScheduleSettings;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentResult {
    pub work_order_id: Uuid,
    pub level: EscalationTier,
    pub business_day: u32,
    /// Recipients with at least one successful delivery.
    pub recipients: usize,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedResult {
    pub work_order_id: Uuid,
    pub error: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WorkOrderResult {
    Sent(SentResult),
    Failed(FailedResult),
}

impl WorkOrderResult {
    pub fn sent(work_order_id: Uuid, level: EscalationTier, business_day: u32, recipients: usize) -> Self {
        WorkOrderResult::Sent(SentResult {
            work_order_id,
            level,
            business_day,
            recipients,
            success: true,
        })
    }

    pub fn failed(work_order_id: Uuid, error: &EscalationError) -> Self {
        WorkOrderResult::Failed(FailedResult {
            work_order_id,
            error: error.to_string(),
            success: false,
        })
    }

    pub fn work_order_id(&self) -> Uuid {
        match self {
            WorkOrderResult::Sent(r) => r.work_order_id,
            WorkOrderResult::Failed(r) => r.work_order_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkOrderResult::Sent(_))
    }
}

/// Outcome of one invocation.
///
/// `success` is false only for fatal errors; per-work-order failures are
/// visible in `results`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    pub message: String,
    /// Total individual notifications delivered.
    pub sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_business_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<WorkOrderResult>>,
    /// Work orders left alone this run (no recipients, already ledgered).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Gate rejected the invocation. Not an error.
    pub fn gated(reason: SkipReason, settings: &ScheduleSettings, is_business_day: bool) -> Self {
        let message = match reason {
            SkipReason::NotBusinessDay => "Not a business day, no reminders sent".to_string(),
            SkipReason::NotNotificationHour => format!(
                "Not notification time (configured {}), no reminders sent",
                settings.notification_time_label()
            ),
        };
        Self {
            success: true,
            message,
            sent: 0,
            is_business_day: Some(is_business_day),
            notification_time: Some(settings.notification_time_label()),
            reason: Some(reason.code()),
            results: None,
            skipped: None,
            error: None,
        }
    }

    pub fn completed(settings: &ScheduleSettings, results: Vec<WorkOrderResult>, sent: usize, skipped: usize) -> Self {
        let failed = results.iter().filter(|r| !r.is_success()).count();
        let message = if results.is_empty() && skipped == 0 {
            "No work orders due for reminders".to_string()
        } else {
            format!(
                "Processed {} work orders: {} notifications sent, {} failed, {} skipped",
                results.len() + skipped,
                sent,
                failed,
                skipped
            )
        };
        Self {
            success: true,
            message,
            sent,
            is_business_day: Some(true),
            notification_time: Some(settings.notification_time_label()),
            reason: None,
            results: Some(results),
            skipped: Some(skipped),
            error: None,
        }
    }

    pub fn fatal(error: &EscalationError) -> Self {
        Self {
            success: false,
            message: "Escalation run failed".to_string(),
            sent: 0,
            is_business_day: None,
            notification_time: None,
            reason: None,
            results: None,
            skipped: None,
            error: Some(error.to_string()),
        }
    }
}
