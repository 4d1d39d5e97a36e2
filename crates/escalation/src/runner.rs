//! Orchestrates one escalation run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use upkeep_core::{DueWorkOrder, Recipient, ReminderRecord};
use upkeep_notify::{MessageRenderer, NotificationDispatcher};

use crate::clock::BusinessDayClock;
use crate::error::EscalationError;
use crate::gate::{self, GateDecision};
use crate::report::{RunReport, WorkOrderResult};
use crate::schedule::ScheduleSettings;
use crate::sources::{AppendOutcome, DueWorkOrderSource, RecipientResolver, ReminderLedger, SettingsStore};

/// Progress of a single work order through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Selected,
    RecipientsResolved,
    Dispatched,
    LedgerWritten,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Selected => "selected",
            Stage::RecipientsResolved => "recipients-resolved",
            Stage::Dispatched => "dispatched",
            Stage::LedgerWritten => "ledger-written",
        }
    }
}

/// What happened to one work order.
enum Processed {
    Done(WorkOrderResult, usize),
    Skipped,
}

pub struct EscalationRunner {
    settings: Arc<dyn SettingsStore>,
    due: Arc<dyn DueWorkOrderSource>,
    resolver: Arc<dyn RecipientResolver>,
    ledger: Arc<dyn ReminderLedger>,
    dispatcher: NotificationDispatcher,
    renderer: MessageRenderer,
    clock: BusinessDayClock,
}

impl EscalationRunner {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        due: Arc<dyn DueWorkOrderSource>,
        resolver: Arc<dyn RecipientResolver>,
        ledger: Arc<dyn ReminderLedger>,
        dispatcher: NotificationDispatcher,
        renderer: MessageRenderer,
    ) -> Self {
        Self {
            settings,
            due,
            resolver,
            ledger,
            dispatcher,
            renderer,
            clock: BusinessDayClock::default(),
        }
    }

    /// Replace the default weekday-only clock.
    pub fn with_clock(mut self, clock: BusinessDayClock) -> Self {
        self.clock = clock;
        self
    }

    /// Load the effective schedule settings.
    pub async fn settings(&self) -> Result<ScheduleSettings, EscalationError> {
        let pairs = self
            .settings
            .load()
            .await
            .map_err(EscalationError::SettingsUnavailable)?;
        Ok(ScheduleSettings::from_pairs(&pairs))
    }

    pub async fn run(&self) -> Result<RunReport, EscalationError> {
        self.run_at(Utc::now()).await
    }

    /// Run as if the current instant were `now`.
    ///
    /// Only settings and due-query failures are returned as errors. Every
    /// per-work-order failure is reported in the result list instead.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport, EscalationError> {
        let settings = self.settings().await.inspect_err(|e| {
            error!(error = %e, "Escalation run aborted: settings unavailable");
        })?;

        if let GateDecision::Closed(reason) = gate::evaluate(&self.clock, &settings, now) {
            let is_business_day = self.clock.is_business_day(now, &settings);
            info!(
                reason = reason.code(),
                local_time = %self.clock.local(now, &settings).format("%Y-%m-%d %H:%M"),
                timezone = settings.timezone.name(),
                "Escalation run gated"
            );
            return Ok(RunReport::gated(reason, &settings, is_business_day));
        }

        let due = self.due.due_work_orders().await.map_err(|e| {
            let err = EscalationError::DueQueryFailed(e);
            error!(error = %err, "Escalation run aborted: due query failed");
            err
        })?;

        info!(count = due.len(), "Due work orders selected");

        let mut results = Vec::with_capacity(due.len());
        let mut sent = 0usize;
        let mut skipped = 0usize;

        for work_order in &due {
            match self.process(work_order, now).await {
                Processed::Done(result, delivered) => {
                    sent += delivered;
                    results.push(result);
                }
                Processed::Skipped => skipped += 1,
            }
        }

        let report = RunReport::completed(&settings, results, sent, skipped);
        info!(sent, skipped, "{}", report.message);
        Ok(report)
    }

    async fn process(&self, work_order: &DueWorkOrder, now: DateTime<Utc>) -> Processed {
        let tier = work_order.next_tier;
        let mut stage = Stage::Selected;

        match self.ledger.contains(work_order.id, tier).await {
            Ok(true) => {
                debug!(
                    work_order_id = %work_order.id,
                    tier = %tier,
                    "Reminder already recorded, skipping"
                );
                return Processed::Skipped;
            }
            Ok(false) => {}
            Err(e) => {
                // The due view already excludes recorded pairs; carry on.
                warn!(work_order_id = %work_order.id, error = %e, "Ledger pre-check failed");
            }
        }

        let recipients = match self.resolver.resolve(work_order.id, tier).await {
            Ok(recipients) => dedupe(recipients),
            Err(e) => return self.fail(work_order, stage, EscalationError::RecipientLookup(e), 0),
        };
        stage = Stage::RecipientsResolved;

        if recipients.is_empty() {
            warn!(
                work_order_id = %work_order.id,
                tier = %tier,
                "No recipients for work order, skipping"
            );
            return Processed::Skipped;
        }

        let message = match self.renderer.render(work_order, tier) {
            Ok(message) => message,
            Err(e) => return self.fail(work_order, stage, EscalationError::Render(e), 0),
        };

        let outcome = self.dispatcher.dispatch(&recipients, &message).await;
        stage = Stage::Dispatched;
        let delivered = outcome.delivered();

        if !outcome.any_delivered() {
            let err = EscalationError::NothingDelivered {
                attempts: outcome.failed(),
                recipients: recipients.len(),
            };
            return self.fail(work_order, stage, err, 0);
        }

        let notified = outcome.notified_user_ids();
        let record = ReminderRecord {
            work_order_id: work_order.id,
            tier,
            business_day: work_order.business_days,
            recipient_ids: notified.clone(),
            created_at: now,
        };

        match self.ledger.append(&record).await {
            Ok(AppendOutcome::Recorded) => {}
            Ok(AppendOutcome::AlreadyRecorded) => {
                debug!(
                    work_order_id = %work_order.id,
                    tier = %tier,
                    "Ledger entry already present"
                );
            }
            Err(e) => return self.fail(work_order, stage, EscalationError::Ledger(e), delivered),
        }
        stage = Stage::LedgerWritten;

        info!(
            work_order_id = %work_order.id,
            tier = %tier,
            business_day = work_order.business_days,
            recipients = notified.len(),
            delivered,
            failed = outcome.failed(),
            stage = stage.as_str(),
            "Reminder sent"
        );

        Processed::Done(
            WorkOrderResult::sent(work_order.id, tier, work_order.business_days, notified.len()),
            delivered,
        )
    }

    fn fail(&self, work_order: &DueWorkOrder, stage: Stage, err: EscalationError, delivered: usize) -> Processed {
        warn!(
            work_order_id = %work_order.id,
            tier = %work_order.next_tier,
            stage = stage.as_str(),
            delivered,
            error = %err,
            "Work order reminder failed"
        );
        Processed::Done(WorkOrderResult::failed(work_order.id, &err), delivered)
    }
}

/// Drop repeated user ids, keeping first occurrence order.
fn dedupe(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients.into_iter().filter(|r| seen.insert(r.user_id)).collect()
}
