use upkeep_core::{EscalationTier, Recipient};
use upkeep_escalation::{RecipientResolver, StoreError};
use uuid::Uuid;

use super::{db_err, decode_err, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct RecipientRow {
    user_id: Uuid,
    full_name: String,
    role: String,
}

#[async_trait::async_trait]
impl RecipientResolver for PgStore {
    /// Delegates to the `escalation_recipients` SQL function, which owns
    /// the tier policy and the ordering.
    async fn resolve(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<Vec<Recipient>, StoreError> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            "SELECT user_id, full_name, role FROM escalation_recipients($1, $2)",
        )
        .bind(work_order_id)
        .bind(tier.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("call escalation_recipients"))?;

        rows.into_iter()
            .map(|row| {
                Ok(Recipient {
                    user_id: row.user_id,
                    full_name: row.full_name,
                    role: row
                        .role
                        .parse()
                        .map_err(|e| decode_err("decode escalation_recipients.role", e))?,
                })
            })
            .collect()
    }
}
