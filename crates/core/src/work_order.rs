use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UpkeepError;

/// Escalation tier of a reminder. Ordered by urgency: `First < Manager < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationTier {
    First,
    Manager,
    Admin,
}

impl EscalationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationTier::First => "first",
            EscalationTier::Manager => "manager",
            EscalationTier::Admin => "admin",
        }
    }
}

impl std::fmt::Display for EscalationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscalationTier {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(EscalationTier::First),
            "manager" => Ok(EscalationTier::Manager),
            "admin" => Ok(EscalationTier::Admin),
            _ => Err(UpkeepError::UnknownTier(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkOrderPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl WorkOrderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderPriority::Low => "low",
            WorkOrderPriority::Medium => "medium",
            WorkOrderPriority::High => "high",
            WorkOrderPriority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for WorkOrderPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderPriority {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(WorkOrderPriority::Low),
            "medium" => Ok(WorkOrderPriority::Medium),
            "high" => Ok(WorkOrderPriority::High),
            "critical" => Ok(WorkOrderPriority::Critical),
            _ => Err(UpkeepError::UnknownPriority(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Technician,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Technician => "technician",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technician" => Ok(UserRole::Technician),
            "manager" => Ok(UserRole::Manager),
            "admin" => Ok(UserRole::Admin),
            _ => Err(UpkeepError::UnknownRole(s.to_string())),
        }
    }
}

/// A work order as yielded by the due-work-order view.
///
/// Read-only input to the escalation engine: the view has already decided
/// which tier is due and filtered out pairs that have a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueWorkOrder {
    pub id: Uuid,
    pub title: String,
    pub priority: WorkOrderPriority,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    /// Business days elapsed since creation.
    pub business_days: u32,
    pub next_tier: EscalationTier,
    pub reminder_count: u32,
}

impl DueWorkOrder {
    /// First eight characters of the id, as shown in notification titles.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }
}

/// A user who must be notified for a work order at a given tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: UserRole,
}

/// A registered push subscription belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEndpoint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Immutable ledger entry: tier `tier` was sent for `work_order_id`.
///
/// At most one record exists per `(work_order_id, tier)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub work_order_id: Uuid,
    pub tier: EscalationTier,
    pub business_day: u32,
    pub recipient_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_urgency() {
        assert!(EscalationTier::First < EscalationTier::Manager);
        assert!(EscalationTier::Manager < EscalationTier::Admin);
    }

    #[test]
    fn tier_parse_rejects_unknown_values() {
        assert_eq!("manager".parse::<EscalationTier>(), Ok(EscalationTier::Manager));
        assert_eq!(" ADMIN ".parse::<EscalationTier>(), Ok(EscalationTier::Admin));
        assert_eq!(
            "supervisor".parse::<EscalationTier>(),
            Err(UpkeepError::UnknownTier("supervisor".to_string()))
        );
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&EscalationTier::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
    }

    #[test]
    fn priority_parse() {
        assert_eq!("critical".parse::<WorkOrderPriority>(), Ok(WorkOrderPriority::Critical));
        assert!("urgent".parse::<WorkOrderPriority>().is_err());
    }

    #[test]
    fn short_id_is_first_eight_chars() {
        let id = Uuid::parse_str("3f2b9c1e-0000-4000-8000-000000000001").unwrap();
        let wo = DueWorkOrder {
            id,
            title: "Pump leak".to_string(),
            priority: WorkOrderPriority::High,
            status: "open".to_string(),
            assigned_to: None,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            business_days: 1,
            next_tier: EscalationTier::First,
            reminder_count: 0,
        };
        assert_eq!(wo.short_id(), "3f2b9c1e");
    }
}
