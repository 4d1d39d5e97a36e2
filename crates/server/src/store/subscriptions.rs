use upkeep_core::PushEndpoint;
use upkeep_notify::{EndpointDirectory, NotifyError};
use uuid::Uuid;

use super::PgStore;

#[async_trait::async_trait]
impl EndpointDirectory for PgStore {
    async fn endpoints_for(&self, user_id: Uuid) -> Result<Vec<PushEndpoint>, NotifyError> {
        sqlx::query_as::<_, (Uuid, Uuid, String, String, String)>(
            "SELECT id, user_id, endpoint, p256dh, auth
             FROM push_subscriptions
             WHERE user_id = $1
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map(|rows| {
            rows.into_iter()
                .map(|(id, user_id, endpoint, p256dh, auth)| PushEndpoint {
                    id,
                    user_id,
                    endpoint,
                    p256dh,
                    auth,
                })
                .collect()
        })
        .map_err(|e| NotifyError::Endpoint(e.to_string()))
    }

    async fn prune(&self, endpoint_id: Uuid) -> Result<(), NotifyError> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(endpoint_id)
            .execute(&self.pool)
            .await
            .map_err(|e| NotifyError::Endpoint(e.to_string()))?;
        if result.rows_affected() > 0 {
            tracing::info!(endpoint_id = %endpoint_id, "Pruned expired push subscription");
        }
        Ok(())
    }
}
