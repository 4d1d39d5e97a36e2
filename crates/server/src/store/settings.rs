use std::collections::HashMap;

use upkeep_escalation::{SettingsStore, StoreError};

use super::{db_err, PgStore};

#[async_trait::async_trait]
impl SettingsStore for PgStore {
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM app_settings")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("load app_settings"))?;
        Ok(rows.into_iter().collect())
    }
}
