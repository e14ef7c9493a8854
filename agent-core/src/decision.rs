use crate::analysis::{Analysis, RootCause};
use crate::tickets::{Severity, Ticket};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    EscalateToEngineering,
    SendWebhookConfigurationGuide,
    UpdateMigrationDocumentation,
    ImmediateSupportEscalation,
    AssignToSupportTeam,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::EscalateToEngineering => "escalate_to_engineering",
            ActionKind::SendWebhookConfigurationGuide => "send_webhook_configuration_guide",
            ActionKind::UpdateMigrationDocumentation => "update_migration_documentation",
            ActionKind::ImmediateSupportEscalation => "immediate_support_escalation",
            ActionKind::AssignToSupportTeam => "assign_to_support_team",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub ticket_id: String,
    pub action: ActionKind,
    pub risk_level: RiskLevel,
    pub requires_approval: bool,
    pub reasoning: String,
    pub confidence: u8,
    pub estimated_impact: String,
    pub analysis: Analysis,
}

/// Map (ticket, analysis) to an action. Pure and total; the rules are
/// evaluated in order and the first match wins, so a multi-merchant pattern
/// is escalated before any root-cause-specific rule can claim it.
pub fn decide(ticket: &Ticket, analysis: &Analysis) -> Decision {
    let (action, risk_level, requires_approval, reasoning) =
        if analysis.is_pattern && analysis.affected_merchants >= 3 {
            (
                ActionKind::EscalateToEngineering,
                RiskLevel::High,
                true,
                format!(
                    "PATTERN DETECTED: {} merchants experiencing same issue. Platform-wide problem likely.",
                    analysis.affected_merchants
                ),
            )
        } else if analysis.root_cause == RootCause::WebhookConfiguration && analysis.confidence > 70 {
            (
                ActionKind::SendWebhookConfigurationGuide,
                RiskLevel::Low,
                false,
                "High confidence merchant configuration error. Automated guide can resolve.".to_string(),
            )
        } else if analysis.root_cause == RootCause::DocumentationGap {
            (
                ActionKind::UpdateMigrationDocumentation,
                RiskLevel::Low,
                false,
                "Documentation unclear. Will update guide and notify affected merchants.".to_string(),
            )
        } else if analysis.root_cause == RootCause::PlatformBug
            || (ticket.severity == Severity::Critical && analysis.confidence > 60)
        {
            (
                ActionKind::EscalateToEngineering,
                RiskLevel::High,
                true,
                "Potential platform bug or critical issue requiring engineering investigation."
                    .to_string(),
            )
        } else if ticket.severity == Severity::Critical {
            (
                ActionKind::ImmediateSupportEscalation,
                RiskLevel::Medium,
                true,
                "Critical severity - requires immediate human attention regardless of root cause."
                    .to_string(),
            )
        } else {
            (
                ActionKind::AssignToSupportTeam,
                RiskLevel::Medium,
                false,
                "Standard support workflow - human agent will investigate.".to_string(),
            )
        };

    let estimated_impact = if analysis.is_pattern {
        format!(
            "{} merchants, ~{} failed checkouts",
            analysis.affected_merchants,
            u64::from(ticket.checkout_failures) * u64::from(analysis.affected_merchants)
        )
    } else {
        format!(
            "1 merchant, {} failed checkouts, {} customers affected",
            ticket.checkout_failures, ticket.affected_customers
        )
    };

    Decision {
        ticket_id: ticket.ticket_id.clone(),
        action,
        risk_level,
        requires_approval,
        reasoning,
        confidence: analysis.confidence,
        estimated_impact,
        analysis: analysis.clone(),
    }
}
