use crate::actions::{action_details, ActionDetails};
use crate::audit::{ActionStatus, AuditEntry, AuditLog, TriggeredBy};
use crate::decision::Decision;
use crate::error::AgentError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_details: Option<ActionDetails>,
    pub decision: Decision,
}

/// In-memory record of every action result produced in this run, used to
/// resume decisions held for human approval. Resolving a pending result
/// mutates it in place rather than adding a second record.
#[derive(Default)]
pub struct DecisionHistory {
    results: Vec<ActionResult>,
}

impl DecisionHistory {
    pub fn record(&mut self, result: ActionResult) {
        self.results.push(result);
    }

    pub fn get_pending(&self, ticket_id: &str) -> Option<&ActionResult> {
        self.pending_index(ticket_id).map(|idx| &self.results[idx])
    }

    pub fn resolve(
        &mut self,
        ticket_id: &str,
        details: ActionDetails,
        message: String,
    ) -> Option<ActionResult> {
        let idx = self.pending_index(ticket_id)?;
        let result = &mut self.results[idx];
        result.status = ActionStatus::Executed;
        result.action_details = Some(details);
        result.message = message;
        Some(result.clone())
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }

    // Most recent first: a ticket can appear multiple times if it was
    // decided more than once, and only the latest pending entry is live.
    fn pending_index(&self, ticket_id: &str) -> Option<usize> {
        self.results.iter().rposition(|r| {
            r.decision.ticket_id == ticket_id && r.status == ActionStatus::PendingApproval
        })
    }
}

/// Execute or defer a decision. Pending results are always audited as
/// system-triggered; executed ones carry the caller's attribution.
/// Exactly one audit entry is appended per call.
pub fn act(
    log: &AuditLog,
    history: &mut DecisionHistory,
    decision: Decision,
    triggered_by: TriggeredBy,
) -> Result<ActionResult, AgentError> {
    let result = if decision.requires_approval {
        let message = format!(
            "Action '{}' requires human approval due to {} risk",
            decision.action.as_str(),
            decision.risk_level.as_str()
        );
        ActionResult {
            status: ActionStatus::PendingApproval,
            message,
            action_details: None,
            decision,
        }
    } else {
        let details = action_details(&decision);
        let message = format!("Automatically executed: {}", decision.action.as_str());
        ActionResult {
            status: ActionStatus::Executed,
            message,
            action_details: Some(details),
            decision,
        }
    };

    let attribution = match result.status {
        ActionStatus::PendingApproval => TriggeredBy::System,
        ActionStatus::Executed => triggered_by,
    };
    append_audit(log, &result, attribution)?;
    history.record(result.clone());
    Ok(result)
}

/// Resume a decision held for human approval. Fails with `NotFound` when
/// the ticket has no live pending result, and appends nothing in that case;
/// a second call for the same ticket therefore fails.
pub fn execute_approved_action(
    log: &AuditLog,
    history: &mut DecisionHistory,
    ticket_id: &str,
) -> Result<ActionResult, AgentError> {
    let pending = history
        .get_pending(ticket_id)
        .ok_or_else(|| AgentError::NotFound(ticket_id.to_string()))?;

    let details = action_details(&pending.decision);
    let message = format!(
        "Human approved and executed: {}",
        pending.decision.action.as_str()
    );
    let resolved = history
        .resolve(ticket_id, details, message)
        .ok_or_else(|| AgentError::NotFound(ticket_id.to_string()))?;

    append_audit(log, &resolved, TriggeredBy::Human)?;
    Ok(resolved)
}

fn append_audit(
    log: &AuditLog,
    result: &ActionResult,
    triggered_by: TriggeredBy,
) -> Result<(), AgentError> {
    log.append(&AuditEntry {
        id: None,
        timestamp: chrono::Local::now().to_rfc3339(),
        ticket_id: result.decision.ticket_id.clone(),
        action: result.decision.action,
        status: result.status,
        risk_level: result.decision.risk_level,
        triggered_by,
        message: result.message.clone(),
    })?;
    Ok(())
}
