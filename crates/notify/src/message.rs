//! Minijinja rendering of reminder titles and bodies.
//!
//! Templates receive the work order, the tier prefix, and the priority
//! marker. The defaults are compiled in; deployments may override them
//! through [`MessageTemplates`].

use upkeep_core::{DueWorkOrder, EscalationTier, WorkOrderPriority};

use crate::traits::{NotifyError, PushData, PushMessage};

pub const DEFAULT_TITLE_TEMPLATE: &str =
    "{{ prefix }}: Ziua {{ business_day }} - WO #{{ short_id }}";

pub const DEFAULT_BODY_TEMPLATE: &str =
    "{{ marker }} {{ title }}\nStatus: {{ status }} · {{ business_day }} zile lucrătoare";

/// Tier-specific title prefix, escalating in urgency.
pub fn tier_prefix(tier: EscalationTier) -> &'static str {
    match tier {
        EscalationTier::First => "🔔 Reminder",
        EscalationTier::Manager => "⚠️ Escaladare Manager",
        EscalationTier::Admin => "🚨 Escaladare Admin",
    }
}

pub fn priority_marker(priority: WorkOrderPriority) -> &'static str {
    match priority {
        WorkOrderPriority::Low => "🟢",
        WorkOrderPriority::Medium => "🟡",
        WorkOrderPriority::High => "🟠",
        WorkOrderPriority::Critical => "🔴",
    }
}

/// Title and body template strings.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    pub title: String,
    pub body: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_TEMPLATE.to_string(),
            body: DEFAULT_BODY_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct MessageContext<'a> {
    prefix: &'static str,
    marker: &'static str,
    tier: &'static str,
    business_day: u32,
    short_id: String,
    work_order_id: String,
    title: &'a str,
    status: &'a str,
    priority: &'static str,
}

/// Renders [`PushMessage`]s for due work orders.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    templates: MessageTemplates,
    icon: String,
    badge: String,
    base_url: String,
}

impl MessageRenderer {
    pub fn new(icon: impl Into<String>, badge: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            templates: MessageTemplates::default(),
            icon: icon.into(),
            badge: badge.into(),
            base_url: base_url.into(),
        }
    }

    /// Replace the templates, validating their syntax first.
    pub fn with_templates(mut self, templates: MessageTemplates) -> Result<Self, NotifyError> {
        validate(&templates.title)?;
        validate(&templates.body)?;
        self.templates = templates;
        Ok(self)
    }

    /// Render the reminder for `work_order` at `tier`.
    pub fn render(&self, work_order: &DueWorkOrder, tier: EscalationTier) -> Result<PushMessage, NotifyError> {
        let ctx = MessageContext {
            prefix: tier_prefix(tier),
            marker: priority_marker(work_order.priority),
            tier: tier.as_str(),
            business_day: work_order.business_days,
            short_id: work_order.short_id(),
            work_order_id: work_order.id.to_string(),
            title: &work_order.title,
            status: &work_order.status,
            priority: work_order.priority.as_str(),
        };

        let env = build_env();
        let title = env
            .render_str(&self.templates.title, &ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        let body = env
            .render_str(&self.templates.body, &ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))?;

        Ok(PushMessage {
            title,
            body,
            icon: self.icon.clone(),
            badge: self.badge.clone(),
            data: PushData {
                url: format!("{}/work-orders/{}", self.base_url, work_order.id),
                work_order_id: work_order.id,
                business_day: work_order.business_days,
            },
        })
    }
}

fn build_env() -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();
    env.add_filter("upper", |value: String| value.to_uppercase());
    env
}

fn validate(template: &str) -> Result<(), NotifyError> {
    build_env()
        .template_from_str(template)
        .map(|_| ())
        .map_err(|e| NotifyError::Template(e.to_string()))
}
