//! Delivery outcomes, aggregated endpoint → recipient → work order.
//!
//! A recipient counts as notified when at least one of its endpoints
//! accepted the message. Failed endpoints never remove a recipient that
//! has a successful one.

use uuid::Uuid;

/// Result of one delivery attempt to one endpoint.
#[derive(Debug, Clone)]
pub struct EndpointOutcome {
    pub endpoint_id: Uuid,
    pub delivered: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// All delivery attempts for a single recipient.
#[derive(Debug, Clone)]
pub struct RecipientOutcome {
    pub user_id: Uuid,
    pub endpoints: Vec<EndpointOutcome>,
    /// Set when the recipient's endpoints could not be listed.
    pub lookup_error: Option<String>,
}

impl RecipientOutcome {
    pub fn delivered_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.delivered).count()
    }

    pub fn failed_count(&self) -> usize {
        self.endpoints.iter().filter(|e| !e.delivered).count()
    }

    pub fn notified(&self) -> bool {
        self.delivered_count() > 0
    }
}

/// Fan-out result for one work order.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub recipients: Vec<RecipientOutcome>,
}

impl DispatchOutcome {
    /// Total successful endpoint deliveries.
    pub fn delivered(&self) -> usize {
        self.recipients.iter().map(RecipientOutcome::delivered_count).sum()
    }

    /// Total failed endpoint deliveries.
    pub fn failed(&self) -> usize {
        self.recipients.iter().map(RecipientOutcome::failed_count).sum()
    }

    /// Recipients with at least one successful delivery, in resolution order.
    pub fn notified_user_ids(&self) -> Vec<Uuid> {
        self.recipients
            .iter()
            .filter(|r| r.notified())
            .map(|r| r.user_id)
            .collect()
    }

    pub fn any_delivered(&self) -> bool {
        self.recipients.iter().any(RecipientOutcome::notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(delivered: bool) -> EndpointOutcome {
        EndpointOutcome {
            endpoint_id: Uuid::new_v4(),
            delivered,
            error: (!delivered).then(|| "boom".to_string()),
            duration_ms: 1,
        }
    }

    #[test]
    fn recipient_with_one_good_endpoint_is_notified() {
        let r = RecipientOutcome {
            user_id: Uuid::new_v4(),
            endpoints: vec![endpoint(false), endpoint(true)],
            lookup_error: None,
        };
        assert!(r.notified());
        assert_eq!(r.delivered_count(), 1);
        assert_eq!(r.failed_count(), 1);
    }

    #[test]
    fn aggregates_across_recipients() {
        let a = RecipientOutcome {
            user_id: Uuid::new_v4(),
            endpoints: vec![endpoint(false)],
            lookup_error: None,
        };
        let b = RecipientOutcome {
            user_id: Uuid::new_v4(),
            endpoints: vec![endpoint(true), endpoint(true)],
            lookup_error: None,
        };
        let b_id = b.user_id;
        let outcome = DispatchOutcome { recipients: vec![a, b] };
        assert_eq!(outcome.delivered(), 2);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.notified_user_ids(), vec![b_id]);
        assert!(outcome.any_delivered());
    }

    #[test]
    fn empty_outcome_delivers_nothing() {
        let outcome = DispatchOutcome::default();
        assert_eq!(outcome.delivered(), 0);
        assert!(!outcome.any_delivered());
        assert!(outcome.notified_user_ids().is_empty());
    }
}
