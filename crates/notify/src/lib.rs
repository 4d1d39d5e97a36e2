//! Push notification delivery for work order reminders.
//!
//! This crate provides:
//! - `PushNotifier` trait for pluggable push providers
//! - `EndpointDirectory` trait for looking up a user's push subscriptions
//! - An HTTP push-gateway notifier implementation
//! - Minijinja rendering of tier-specific reminder messages
//! - `NotificationDispatcher`, which fans out to recipients and endpoints
//!   and aggregates per-level outcomes

pub mod dispatcher;
pub mod message;
pub mod outcome;
pub mod push;
pub mod traits;

pub use dispatcher::NotificationDispatcher;
pub use message::{MessageRenderer, MessageTemplates};
pub use outcome::{DispatchOutcome, EndpointOutcome, RecipientOutcome};
pub use push::PushGatewayNotifier;
pub use traits::{EndpointDirectory, NotifyError, PushData, PushMessage, PushNotifier};
