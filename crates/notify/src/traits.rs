//! Notifier and endpoint-directory traits plus shared error types.

use upkeep_core::PushEndpoint;
use uuid::Uuid;

/// Errors that can occur during push delivery or endpoint lookup.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push provider rejected delivery ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Push subscription is gone ({status})")]
    Gone { status: u16 },

    #[error("Delivery timed out after {0}ms")]
    Timeout(u64),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Endpoint lookup failed: {0}")]
    Endpoint(String),
}

/// Client-side routing data carried with every push.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
    pub url: String,
    pub work_order_id: Uuid,
    pub business_day: u32,
}

/// A rendered push message, serialized as the provider payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: PushData,
}

/// Trait for push provider implementations.
#[async_trait::async_trait]
pub trait PushNotifier: Send + Sync {
    /// Deliver one message to one endpoint. Exactly one attempt, no retries.
    async fn send(&self, endpoint: &PushEndpoint, message: &PushMessage) -> Result<(), NotifyError>;

    /// Human-readable provider name for logs.
    fn channel_name(&self) -> &str;
}

/// Lookup of the push subscriptions registered by a user.
#[async_trait::async_trait]
pub trait EndpointDirectory: Send + Sync {
    async fn endpoints_for(&self, user_id: Uuid) -> Result<Vec<PushEndpoint>, NotifyError>;

    /// Remove a subscription the provider reported as gone.
    async fn prune(&self, endpoint_id: Uuid) -> Result<(), NotifyError>;
}
