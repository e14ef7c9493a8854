use crate::analysis::{Analysis, RootCause};
use crate::tickets::Ticket;

/// Deterministic keyword classifier over the lower-cased error log.
/// First match wins. Always available; used standalone in demo mode and as
/// the fallback when the model strategy fails.
pub fn classify_by_rules(ticket: &Ticket) -> Analysis {
    let log = ticket.error_log.to_lowercase();

    let (root_cause, explanation, confidence) = if log.contains("webhook") || log.contains("timeout") {
        (
            RootCause::WebhookConfiguration,
            "Error log indicates webhook or timeout issues, likely merchant configuration.",
            75,
        )
    } else if log.contains("migration") || log.contains("legacy") {
        (
            RootCause::MigrationIssue,
            "Error log indicates migration-related problems.",
            70,
        )
    } else if log.contains("null") || log.contains("undefined") || log.contains("bug") {
        (
            RootCause::PlatformBug,
            "Error log suggests potential platform bug or code issue.",
            65,
        )
    } else if log.contains("inventory") || log.contains("sync") {
        (
            RootCause::MigrationIssue,
            "Inventory sync issues often occur during platform migration.",
            70,
        )
    } else if log.contains("shipping") || log.contains("cart") {
        (
            RootCause::WebhookConfiguration,
            "Shipping/cart errors typically relate to webhook configuration.",
            68,
        )
    } else {
        (
            RootCause::DocumentationGap,
            "Unable to determine exact cause; may need better documentation.",
            55,
        )
    };

    Analysis {
        root_cause,
        root_cause_explanation: format!("[Rule-based Analysis] {explanation}"),
        is_pattern: false,
        pattern_details: String::new(),
        confidence,
        assumptions: vec!["Using rule-based analysis (LLM unavailable or demo mode)".into()],
        affected_merchants: 1,
        recommended_priority: ticket.severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::Severity;

    fn ticket(error_log: &str, severity: Severity) -> Ticket {
        Ticket {
            ticket_id: "T001".into(),
            merchant_id: "M100".into(),
            issue: "issue".into(),
            merchant_message: "message".into(),
            error_log: error_log.into(),
            migration_stage: "post-migration-day-1".into(),
            severity,
            checkout_failures: 10,
            affected_customers: 5,
        }
    }

    #[test]
    fn webhook_timeout_maps_to_webhook_configuration() {
        let analysis = classify_by_rules(&ticket(
            "WebhookTimeout: order.created webhook failed after 30s",
            Severity::Critical,
        ));
        assert_eq!(analysis.root_cause, RootCause::WebhookConfiguration);
        assert_eq!(analysis.confidence, 75);
        assert!(!analysis.is_pattern);
        assert_eq!(analysis.affected_merchants, 1);
        assert_eq!(analysis.recommended_priority, Severity::Critical);
        assert!(analysis.root_cause_explanation.starts_with("[Rule-based Analysis]"));
    }

    #[test]
    fn legacy_maps_to_migration_issue() {
        let analysis = classify_by_rules(&ticket(
            "ShippingError: Legacy shipping rules not migrated to new format",
            Severity::Medium,
        ));
        // "legacy" matches before the shipping branch is reached.
        assert_eq!(analysis.root_cause, RootCause::MigrationIssue);
        assert_eq!(analysis.confidence, 70);
    }

    #[test]
    fn null_reference_maps_to_platform_bug() {
        let analysis = classify_by_rules(&ticket(
            "TypeError: cannot read property of undefined",
            Severity::High,
        ));
        assert_eq!(analysis.root_cause, RootCause::PlatformBug);
        assert_eq!(analysis.confidence, 65);
    }

    #[test]
    fn inventory_sync_maps_to_migration_issue() {
        let analysis = classify_by_rules(&ticket(
            "InventoryError: stock counts frozen at snapshot",
            Severity::Critical,
        ));
        assert_eq!(analysis.root_cause, RootCause::MigrationIssue);
        assert_eq!(analysis.confidence, 70);
    }

    #[test]
    fn cart_maps_to_webhook_configuration() {
        let analysis = classify_by_rules(&ticket(
            "SessionError: cart cookie format incompatible",
            Severity::High,
        ));
        assert_eq!(analysis.root_cause, RootCause::WebhookConfiguration);
        assert_eq!(analysis.confidence, 68);
    }

    #[test]
    fn unmatched_log_falls_through_to_documentation_gap() {
        let analysis = classify_by_rules(&ticket("something unexpected", Severity::Low));
        assert_eq!(analysis.root_cause, RootCause::DocumentationGap);
        assert_eq!(analysis.confidence, 55);
    }

    #[test]
    fn pure_function_of_error_log_text() {
        let a = classify_by_rules(&ticket("401 Unauthorized: Bearer token expected", Severity::Low));
        let b = classify_by_rules(&ticket("401 Unauthorized: Bearer token expected", Severity::Low));
        assert_eq!(a, b);
    }
}
