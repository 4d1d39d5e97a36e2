//! In-memory collaborators for escalation scenario tests.
//!
//! `World` plays the data store: it computes the due list the same way the
//! `due_work_orders` view does (highest reached threshold, excluding tiers
//! already ledgered or below a ledgered tier) and resolves recipients with
//! the same first/manager/admin policy.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use upkeep_core::{
    DueWorkOrder, EscalationTier, PushEndpoint, Recipient, ReminderRecord, UserRole, WorkOrderPriority,
};
use upkeep_escalation::{
    AppendOutcome, BusinessDayClock, DueWorkOrderSource, EscalationRunner, RecipientResolver,
    ReminderLedger, ScheduleSettings, SettingsStore, StoreError,
};
use upkeep_notify::{
    EndpointDirectory, MessageRenderer, NotificationDispatcher, NotifyError, PushMessage, PushNotifier,
};
use uuid::Uuid;

/// Local Bucharest wall-clock instant.
pub fn bucharest(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::Europe::Bucharest
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn thresholds(priority: WorkOrderPriority) -> [(EscalationTier, u32); 3] {
    let (a, b, c) = match priority {
        WorkOrderPriority::Critical => (1, 4, 7),
        WorkOrderPriority::High => (1, 3, 5),
        WorkOrderPriority::Medium => (2, 4, 7),
        WorkOrderPriority::Low => (3, 6, 10),
    };
    [
        (EscalationTier::First, a),
        (EscalationTier::Manager, b),
        (EscalationTier::Admin, c),
    ]
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct WorkOrder {
    pub id: Uuid,
    pub title: String,
    pub priority: WorkOrderPriority,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct World {
    pub settings: Mutex<HashMap<String, String>>,
    pub users: Mutex<Vec<User>>,
    pub work_orders: Mutex<Vec<WorkOrder>>,
    pub endpoints: Mutex<HashMap<Uuid, Vec<PushEndpoint>>>,
    pub ledger: Mutex<Vec<ReminderRecord>>,
    /// Instant the due view evaluates against.
    pub now: Mutex<Option<DateTime<Utc>>>,

    pub fail_settings: AtomicBool,
    pub fail_due: AtomicBool,
    pub fail_ledger_append: AtomicBool,
    pub fail_ledger_contains: AtomicBool,
    pub failing_resolve: Mutex<HashSet<Uuid>>,
    /// Due entries returned even though they are ledgered (stale view).
    pub stale_due: Mutex<Vec<DueWorkOrder>>,

    pub settings_loads: AtomicUsize,
    pub ledger_appends: AtomicUsize,
}

impl World {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = Some(now);
    }

    pub fn add_user(&self, name: &str, role: UserRole, endpoints: usize) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().push(User {
            id,
            full_name: name.to_string(),
            role,
        });
        let eps = (0..endpoints)
            .map(|i| PushEndpoint {
                id: Uuid::new_v4(),
                user_id: id,
                endpoint: format!("https://push.example/{id}/{i}"),
                p256dh: "p256dh".to_string(),
                auth: "auth".to_string(),
            })
            .collect();
        self.endpoints.lock().unwrap().insert(id, eps);
        id
    }

    pub fn endpoint_ids(&self, user_id: Uuid) -> Vec<Uuid> {
        self.endpoints
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|eps| eps.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    pub fn add_work_order(
        &self,
        title: &str,
        priority: WorkOrderPriority,
        assigned_to: Option<Uuid>,
        created_by: Uuid,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.work_orders.lock().unwrap().push(WorkOrder {
            id,
            title: title.to_string(),
            priority,
            status: "open".to_string(),
            assigned_to,
            created_by,
            created_at,
        });
        id
    }

    pub fn records_for(&self, work_order_id: Uuid) -> Vec<ReminderRecord> {
        self.ledger
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.work_order_id == work_order_id)
            .cloned()
            .collect()
    }

    fn compute_due(&self, now: DateTime<Utc>) -> Vec<DueWorkOrder> {
        let settings = ScheduleSettings::from_pairs(&self.settings.lock().unwrap());
        let clock = BusinessDayClock::weekdays();
        let ledger = self.ledger.lock().unwrap();

        let mut due = Vec::new();
        for wo in self.work_orders.lock().unwrap().iter() {
            if wo.status == "completed" || wo.status == "cancelled" {
                continue;
            }
            let days = clock.business_days_between(wo.created_at, now, &settings);
            let reached = thresholds(wo.priority)
                .iter()
                .filter(|(_, min)| days >= *min)
                .map(|(tier, _)| *tier)
                .max();
            let Some(tier) = reached else { continue };

            let recorded: Vec<EscalationTier> = ledger
                .iter()
                .filter(|r| r.work_order_id == wo.id)
                .map(|r| r.tier)
                .collect();
            if recorded.iter().any(|t| *t >= tier) {
                continue;
            }

            due.push(DueWorkOrder {
                id: wo.id,
                title: wo.title.clone(),
                priority: wo.priority,
                status: wo.status.clone(),
                assigned_to: wo.assigned_to,
                created_by: wo.created_by,
                created_at: wo.created_at,
                business_days: days,
                next_tier: tier,
                reminder_count: recorded.len() as u32,
            });
        }
        due
    }
}

fn store_err(context: &str) -> StoreError {
    StoreError::new(context, "simulated outage")
}

#[async_trait::async_trait]
impl SettingsStore for World {
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        self.settings_loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(store_err("load settings"));
        }
        Ok(self.settings.lock().unwrap().clone())
    }
}

#[async_trait::async_trait]
impl DueWorkOrderSource for World {
    async fn due_work_orders(&self) -> Result<Vec<DueWorkOrder>, StoreError> {
        if self.fail_due.load(Ordering::SeqCst) {
            return Err(store_err("query due work orders"));
        }
        let now = self.now.lock().unwrap().unwrap_or_else(Utc::now);
        let mut due = self.compute_due(now);
        due.extend(self.stale_due.lock().unwrap().iter().cloned());
        Ok(due)
    }
}

#[async_trait::async_trait]
impl RecipientResolver for World {
    async fn resolve(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<Vec<Recipient>, StoreError> {
        if self.failing_resolve.lock().unwrap().contains(&work_order_id) {
            return Err(store_err("resolve recipients"));
        }
        let work_orders = self.work_orders.lock().unwrap();
        let Some(wo) = work_orders.iter().find(|w| w.id == work_order_id) else {
            return Ok(Vec::new());
        };
        let users = self.users.lock().unwrap();
        let as_recipient = |u: &User| Recipient {
            user_id: u.id,
            full_name: u.full_name.clone(),
            role: u.role,
        };

        let owner = wo.assigned_to.unwrap_or(wo.created_by);
        let mut out: Vec<Recipient> = users.iter().filter(|u| u.id == owner).map(as_recipient).collect();
        let wanted: &[UserRole] = match tier {
            EscalationTier::First => &[],
            EscalationTier::Manager => &[UserRole::Manager],
            EscalationTier::Admin => &[UserRole::Manager, UserRole::Admin],
        };
        out.extend(users.iter().filter(|u| wanted.contains(&u.role)).map(as_recipient));
        Ok(out)
    }
}

#[async_trait::async_trait]
impl ReminderLedger for World {
    async fn contains(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<bool, StoreError> {
        if self.fail_ledger_contains.load(Ordering::SeqCst) {
            return Err(store_err("check ledger"));
        }
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.work_order_id == work_order_id && r.tier == tier))
    }

    async fn append(&self, record: &ReminderRecord) -> Result<AppendOutcome, StoreError> {
        if self.fail_ledger_append.load(Ordering::SeqCst) {
            return Err(store_err("append reminder"));
        }
        let mut ledger = self.ledger.lock().unwrap();
        if ledger
            .iter()
            .any(|r| r.work_order_id == record.work_order_id && r.tier == record.tier)
        {
            return Ok(AppendOutcome::AlreadyRecorded);
        }
        self.ledger_appends.fetch_add(1, Ordering::SeqCst);
        ledger.push(record.clone());
        Ok(AppendOutcome::Recorded)
    }
}

#[async_trait::async_trait]
impl EndpointDirectory for World {
    async fn endpoints_for(&self, user_id: Uuid) -> Result<Vec<PushEndpoint>, NotifyError> {
        Ok(self.endpoints.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
    }

    async fn prune(&self, endpoint_id: Uuid) -> Result<(), NotifyError> {
        for eps in self.endpoints.lock().unwrap().values_mut() {
            eps.retain(|e| e.id != endpoint_id);
        }
        Ok(())
    }
}

/// Records every send; fails for endpoints in `failing`.
#[derive(Default)]
pub struct RecordingNotifier {
    pub send_count: Arc<AtomicUsize>,
    pub sent: Mutex<Vec<(Uuid, PushMessage)>>,
    pub failing: Mutex<HashSet<Uuid>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.title.clone()).collect()
    }

    pub fn fail_endpoint(&self, endpoint_id: Uuid) {
        self.failing.lock().unwrap().insert(endpoint_id);
    }
}

#[async_trait::async_trait]
impl PushNotifier for RecordingNotifier {
    async fn send(&self, endpoint: &PushEndpoint, message: &PushMessage) -> Result<(), NotifyError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&endpoint.id) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "provider down".to_string(),
            });
        }
        self.sent.lock().unwrap().push((endpoint.user_id, message.clone()));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

pub struct Harness {
    pub world: Arc<World>,
    pub notifier: Arc<RecordingNotifier>,
    pub runner: EscalationRunner,
}

impl Harness {
    pub fn new() -> Self {
        let world = World::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone(), world.clone());
        let renderer = MessageRenderer::new("/icons/icon-192x192.png", "/icons/badge-72x72.png", "");
        let runner = EscalationRunner::new(
            world.clone(),
            world.clone(),
            world.clone(),
            world.clone(),
            dispatcher,
            renderer,
        );
        Self {
            world,
            notifier,
            runner,
        }
    }

    pub fn sends(&self) -> usize {
        self.notifier.send_count.load(Ordering::SeqCst)
    }

    /// Run the engine with the due view evaluated at the same instant.
    pub async fn run_at(&self, now: DateTime<Utc>) -> upkeep_escalation::RunReport {
        self.world.set_now(now);
        self.runner.run_at(now).await.expect("run should not be fatal")
    }
}
