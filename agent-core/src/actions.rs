use crate::decision::{ActionKind, Decision};
use serde::{Deserialize, Serialize};

/// Simulated side-effect record for an executed action. One variant per
/// action kind, so an unrepresentable action cannot reach execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDetails {
    AutomatedEmail {
        to: String,
        subject: String,
        body_preview: String,
        kb_article: String,
        execution_time: String,
    },
    DocumentationUpdate {
        page: String,
        section: String,
        change: String,
        also_notify: String,
        execution_time: String,
    },
    SupportTicketEscalation {
        priority: String,
        assigned_to: String,
        sla: String,
        notification_sent: String,
        execution_time: String,
    },
    EngineeringEscalation {
        jira_ticket: String,
        priority: String,
        title: String,
        assigned_team: String,
        impact: String,
        execution_time: String,
    },
    SupportQueue {
        queue: String,
        priority: String,
        auto_response_sent: bool,
        estimated_response: String,
        execution_time: String,
    },
}

pub fn action_details(decision: &Decision) -> ActionDetails {
    match decision.action {
        ActionKind::SendWebhookConfigurationGuide => ActionDetails::AutomatedEmail {
            to: format!("merchant_{}@example.com", decision.ticket_id),
            subject: "Action Required: Update Webhook Configuration for Headless Migration".into(),
            body_preview: "We detected your webhook endpoint is using the old URL format. \
                           Please update to: https://api.yourstore.com/webhooks/v2/..."
                .into(),
            kb_article: "https://docs.platform.com/migration/webhooks".into(),
            execution_time: "0.3 seconds".into(),
        },
        ActionKind::UpdateMigrationDocumentation => ActionDetails::DocumentationUpdate {
            page: "Headless Migration Guide".into(),
            section: "Webhook Configuration".into(),
            change: "Added clarification about webhook URL format changes and endpoint updates"
                .into(),
            also_notify: "All merchants in migration-in-progress stage".into(),
            execution_time: "1.2 seconds".into(),
        },
        ActionKind::ImmediateSupportEscalation => ActionDetails::SupportTicketEscalation {
            priority: "P0 - Critical".into(),
            assigned_to: "Senior Support Engineer (on-call)".into(),
            sla: "15 minutes response time".into(),
            notification_sent: "Slack + PagerDuty".into(),
            execution_time: "0.5 seconds".into(),
        },
        ActionKind::EscalateToEngineering => ActionDetails::EngineeringEscalation {
            jira_ticket: format!("PLATFORM-{}", ticket_suffix(&decision.ticket_id)),
            priority: "Critical".into(),
            title: if decision.analysis.pattern_details.is_empty() {
                "Pattern detected: Multiple merchant issues".into()
            } else {
                format!("Pattern detected: {}", decision.analysis.pattern_details)
            },
            assigned_team: "Platform Engineering".into(),
            impact: decision.estimated_impact.clone(),
            execution_time: "0.8 seconds".into(),
        },
        ActionKind::AssignToSupportTeam => ActionDetails::SupportQueue {
            queue: "Migration Support Tier 2".into(),
            priority: "Normal".into(),
            auto_response_sent: true,
            estimated_response: "2 hours".into(),
            execution_time: "0.2 seconds".into(),
        },
    }
}

fn ticket_suffix(ticket_id: &str) -> String {
    let chars: Vec<char> = ticket_id.chars().collect();
    let start = chars.len().saturating_sub(3);
    chars[start..].iter().collect()
}
