use upkeep_core::{EscalationTier, ReminderRecord};
use upkeep_escalation::{AppendOutcome, ReminderLedger, StoreError};
use uuid::Uuid;

use super::{db_err, PgStore};

#[async_trait::async_trait]
impl ReminderLedger for PgStore {
    async fn contains(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM work_order_reminders
                WHERE work_order_id = $1 AND tier = $2
             )",
        )
        .bind(work_order_id)
        .bind(tier.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("check work_order_reminders"))
    }

    /// Insert the record; the `(work_order_id, tier)` unique constraint
    /// turns a concurrent duplicate into [`AppendOutcome::AlreadyRecorded`].
    async fn append(&self, record: &ReminderRecord) -> Result<AppendOutcome, StoreError> {
        let result = sqlx::query(
            "INSERT INTO work_order_reminders
                (id, work_order_id, tier, business_day, recipient_ids, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (work_order_id, tier) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(record.work_order_id)
        .bind(record.tier.as_str())
        .bind(record.business_day as i32)
        .bind(&record.recipient_ids)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("insert work_order_reminders"))?;

        Ok(if result.rows_affected() == 0 {
            AppendOutcome::AlreadyRecorded
        } else {
            AppendOutcome::Recorded
        })
    }
}
