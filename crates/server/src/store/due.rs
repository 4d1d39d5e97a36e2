use chrono::{DateTime, Utc};
use upkeep_core::DueWorkOrder;
use upkeep_escalation::{DueWorkOrderSource, StoreError};
use uuid::Uuid;

use super::{db_err, decode_err, PgStore};

/// Row from the `due_work_orders` view.
#[derive(Debug, sqlx::FromRow)]
struct DueRow {
    id: Uuid,
    title: String,
    priority: String,
    status: String,
    assigned_to: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    business_days: i32,
    next_tier: String,
    reminder_count: i64,
}

impl TryFrom<DueRow> for DueWorkOrder {
    type Error = StoreError;

    fn try_from(row: DueRow) -> Result<Self, Self::Error> {
        Ok(DueWorkOrder {
            id: row.id,
            title: row.title,
            priority: row
                .priority
                .parse()
                .map_err(|e| decode_err("decode due_work_orders.priority", e))?,
            status: row.status,
            assigned_to: row.assigned_to,
            created_by: row.created_by,
            created_at: row.created_at,
            business_days: row.business_days.max(0) as u32,
            next_tier: row
                .next_tier
                .parse()
                .map_err(|e| decode_err("decode due_work_orders.next_tier", e))?,
            reminder_count: row.reminder_count.max(0) as u32,
        })
    }
}

#[async_trait::async_trait]
impl DueWorkOrderSource for PgStore {
    async fn due_work_orders(&self) -> Result<Vec<DueWorkOrder>, StoreError> {
        let rows = sqlx::query_as::<_, DueRow>(
            "SELECT id, title, priority, status, assigned_to, created_by, created_at,
                    business_days, next_tier, reminder_count
             FROM due_work_orders
             ORDER BY business_days DESC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("query due_work_orders"))?;

        rows.into_iter().map(DueWorkOrder::try_from).collect()
    }
}
