use serde::{Deserialize, Serialize};

/// Raw ticket payload as it arrives over the wire, before the core model
/// takes over. Severity stays a string here so that validation can produce
/// a useful message instead of a serde type error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalTicketV1 {
    pub ticket_id: String,
    pub merchant_id: String,
    pub issue: String,
    #[serde(default)]
    pub merchant_message: String,
    pub error_log: String,
    pub migration_stage: String,
    pub severity: String,
    #[serde(default)]
    pub checkout_failures: u32,
    #[serde(default)]
    pub affected_customers: u32,
}

pub fn validate_ticket_v1(ticket: &CanonicalTicketV1) -> Result<(), String> {
    if ticket.ticket_id.trim().is_empty() {
        return Err("ticket_id is required".into());
    }
    if ticket.merchant_id.trim().is_empty() {
        return Err("merchant_id is required".into());
    }
    if ticket.issue.trim().is_empty() {
        return Err("issue is required".into());
    }
    if ticket.error_log.trim().is_empty() {
        return Err("error_log is required".into());
    }
    if ticket.migration_stage.trim().is_empty() {
        return Err("migration_stage is required".into());
    }
    match ticket.severity.to_lowercase().as_str() {
        "low" | "medium" | "high" | "critical" => {}
        other => return Err(format!("invalid severity '{other}'")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalTicketV1 {
        CanonicalTicketV1 {
            ticket_id: "T001".into(),
            merchant_id: "M123".into(),
            issue: "Checkout page shows 'Webhook timeout' error".into(),
            merchant_message: "Customers can't complete purchases".into(),
            error_log: "WebhookTimeout: order.created webhook failed after 30s".into(),
            migration_stage: "post-migration-day-1".into(),
            severity: "critical".into(),
            checkout_failures: 42,
            affected_customers: 20,
        }
    }

    #[test]
    fn validates_ticket_v1() {
        assert!(validate_ticket_v1(&sample()).is_ok());
    }

    #[test]
    fn rejects_missing_ticket_id() {
        let mut ticket = sample();
        ticket.ticket_id = "  ".into();
        assert_eq!(
            validate_ticket_v1(&ticket),
            Err("ticket_id is required".to_string())
        );
    }

    #[test]
    fn rejects_unknown_severity() {
        let mut ticket = sample();
        ticket.severity = "urgent".into();
        assert_eq!(
            validate_ticket_v1(&ticket),
            Err("invalid severity 'urgent'".to_string())
        );
    }

    #[test]
    fn counters_default_to_zero() {
        let payload = serde_json::json!({
            "ticket_id": "T002",
            "merchant_id": "M200",
            "issue": "Stock levels incorrect",
            "merchant_message": "Inventory not syncing",
            "error_log": "InventorySyncError: webhook not triggering",
            "migration_stage": "migration-in-progress",
            "severity": "high"
        });
        let ticket: CanonicalTicketV1 =
            serde_json::from_value(payload).expect("deserialize");
        assert_eq!(ticket.checkout_failures, 0);
        assert_eq!(ticket.affected_customers, 0);
        assert!(validate_ticket_v1(&ticket).is_ok());
    }
}
