//! Fans a reminder out to every endpoint of every recipient.
//!
//! Each endpoint gets exactly one attempt, bounded by a timeout. A failing
//! endpoint doesn't block the remaining endpoints, recipients, or work orders.

use std::sync::Arc;
use std::time::{Duration, Instant};

use upkeep_core::{PushEndpoint, Recipient};

use crate::outcome::{DispatchOutcome, EndpointOutcome, RecipientOutcome};
use crate::traits::{EndpointDirectory, NotifyError, PushMessage, PushNotifier};

/// Default per-endpoint delivery timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers reminder messages to recipients' registered push endpoints.
pub struct NotificationDispatcher {
    notifier: Arc<dyn PushNotifier>,
    directory: Arc<dyn EndpointDirectory>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn PushNotifier>, directory: Arc<dyn EndpointDirectory>) -> Self {
        Self {
            notifier,
            directory,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-endpoint delivery timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deliver `message` to all recipients, in order.
    pub async fn dispatch(&self, recipients: &[Recipient], message: &PushMessage) -> DispatchOutcome {
        let mut outcome = DispatchOutcome {
            recipients: Vec::with_capacity(recipients.len()),
        };

        for recipient in recipients {
            outcome.recipients.push(self.dispatch_recipient(recipient, message).await);
        }

        tracing::debug!(
            work_order_id = %message.data.work_order_id,
            delivered = outcome.delivered(),
            failed = outcome.failed(),
            "Dispatch finished"
        );

        outcome
    }

    async fn dispatch_recipient(&self, recipient: &Recipient, message: &PushMessage) -> RecipientOutcome {
        let endpoints = match self.directory.endpoints_for(recipient.user_id).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::warn!(
                    user_id = %recipient.user_id,
                    error = %e,
                    "Failed to list push endpoints"
                );
                return RecipientOutcome {
                    user_id: recipient.user_id,
                    endpoints: Vec::new(),
                    lookup_error: Some(e.to_string()),
                };
            }
        };

        if endpoints.is_empty() {
            tracing::debug!(
                user_id = %recipient.user_id,
                name = %recipient.full_name,
                "Recipient has no push endpoints"
            );
        }

        let mut results = Vec::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            results.push(self.deliver(endpoint, message).await);
        }

        RecipientOutcome {
            user_id: recipient.user_id,
            endpoints: results,
            lookup_error: None,
        }
    }

    async fn deliver(&self, endpoint: &PushEndpoint, message: &PushMessage) -> EndpointOutcome {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.notifier.send(endpoint, message)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.timeout.as_millis() as u64)),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::debug!(
                    endpoint_id = %endpoint.id,
                    user_id = %endpoint.user_id,
                    channel = self.notifier.channel_name(),
                    duration_ms,
                    "Push delivered"
                );
                EndpointOutcome {
                    endpoint_id: endpoint.id,
                    delivered: true,
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => {
                tracing::warn!(
                    endpoint_id = %endpoint.id,
                    user_id = %endpoint.user_id,
                    channel = self.notifier.channel_name(),
                    error = %e,
                    duration_ms,
                    "Push delivery failed"
                );
                if matches!(e, NotifyError::Gone { .. }) {
                    if let Err(prune_err) = self.directory.prune(endpoint.id).await {
                        tracing::warn!(
                            endpoint_id = %endpoint.id,
                            error = %prune_err,
                            "Failed to prune stale push endpoint"
                        );
                    }
                }
                EndpointOutcome {
                    endpoint_id: endpoint.id,
                    delivered: false,
                    error: Some(e.to_string()),
                    duration_ms,
                }
            }
        }
    }
}
