//! HTTP push-gateway notifier.
//!
//! Posts `{ subscription, payload }` to a push provider gateway, which
//! handles the Web Push encryption and the fan-out to browser vendors.
//! The provider server key is sent as `Authorization: key=<key>`.

use std::time::Duration;

use upkeep_core::PushEndpoint;

use crate::traits::{NotifyError, PushMessage, PushNotifier};

/// Delivers push messages through an HTTP gateway.
#[derive(Debug)]
pub struct PushGatewayNotifier {
    /// Gateway URL (env vars already resolved).
    url: String,
    server_key: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl PushGatewayNotifier {
    /// Create a new gateway notifier.
    ///
    /// Environment variable references (`${VAR_NAME}`) in `url` and
    /// `server_key` are resolved eagerly. Missing env vars or an empty
    /// key produce a [`NotifyError::Config`] error.
    pub fn new(url: &str, server_key: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let url = resolve_env_vars(url)?;
        let server_key = resolve_env_vars(server_key)?;

        if url.is_empty() {
            return Err(NotifyError::Config("push gateway URL must not be empty".to_string()));
        }
        if server_key.is_empty() {
            return Err(NotifyError::Config("push server key must not be empty".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url,
            server_key,
            client,
        })
    }
}

/// Request body sent to the gateway for one endpoint.
pub(crate) fn gateway_body(endpoint: &PushEndpoint, message: &PushMessage) -> serde_json::Value {
    serde_json::json!({
        "subscription": {
            "endpoint": endpoint.endpoint,
            "keys": {
                "p256dh": endpoint.p256dh,
                "auth": endpoint.auth,
            },
        },
        "payload": message,
    })
}

#[async_trait::async_trait]
impl PushNotifier for PushGatewayNotifier {
    async fn send(&self, endpoint: &PushEndpoint, message: &PushMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(&gateway_body(endpoint, message))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(NotifyError::Gone {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::warn!(
            url = %self.url,
            %status,
            body = %body,
            "push gateway returned non-2xx status"
        );
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "push-gateway"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
