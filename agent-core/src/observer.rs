use crate::tickets::{Severity, Ticket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view over the full ticket set, recomputed on every observe
/// call and shared by every classification in the same run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub total_tickets: usize,
    pub error_patterns: BTreeMap<String, usize>,
    pub critical_count: usize,
    pub migration_stages: BTreeMap<String, usize>,
    pub total_checkout_failures: u64,
    pub total_affected_customers: u64,
}

/// Error kind is the text before the first colon of the error log.
pub fn error_kind(error_log: &str) -> &str {
    match error_log.split_once(':') {
        Some((kind, _)) => kind,
        None => "Unknown",
    }
}

pub fn observe(tickets: &[Ticket]) -> PatternSummary {
    let mut summary = PatternSummary {
        total_tickets: tickets.len(),
        ..PatternSummary::default()
    };

    for ticket in tickets {
        *summary
            .error_patterns
            .entry(error_kind(&ticket.error_log).to_string())
            .or_default() += 1;
        *summary
            .migration_stages
            .entry(ticket.migration_stage.clone())
            .or_default() += 1;
        if ticket.severity == Severity::Critical {
            summary.critical_count += 1;
        }
        summary.total_checkout_failures += u64::from(ticket.checkout_failures);
        summary.total_affected_customers += u64::from(ticket.affected_customers);
    }

    summary
}
