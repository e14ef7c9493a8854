use crate::analysis::Analysis;
use crate::audit::{AuditLog, TriggeredBy};
use crate::decision::{decide, Decision};
use crate::error::AgentError;
use crate::executor::{self, ActionResult, DecisionHistory};
use crate::llm::{self, LlmConfig};
use crate::observer::{observe, PatternSummary};
use crate::rules;
use crate::tickets::{Ticket, TicketStore};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Debug, Serialize)]
pub struct PipelineResult {
    pub ticket: Ticket,
    pub analysis: Analysis,
    pub decision: Decision,
    pub action_result: ActionResult,
}

/// Owns the pipeline stages and the state they share: the ticket source,
/// the audit trail, and the decision history used for approval resumption.
pub struct Agent {
    tickets: TicketStore,
    audit: AuditLog,
    history: DecisionHistory,
    llm: Option<LlmConfig>,
}

impl Agent {
    pub fn new(tickets: TicketStore, audit: AuditLog, llm: Option<LlmConfig>) -> Self {
        Self {
            tickets,
            audit,
            history: DecisionHistory::default(),
            llm,
        }
    }

    pub fn ticket_store(&self) -> &TicketStore {
        &self.tickets
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Total over all ticket shapes: when no model is configured, or the
    /// model strategy fails for any reason, the rule strategy answers.
    pub fn classify(&self, ticket: &Ticket, patterns: &PatternSummary) -> Analysis {
        let Some(config) = self.llm.as_ref() else {
            return rules::classify_by_rules(ticket);
        };

        match llm::analyze(config, ticket, patterns) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(
                    ticket = %ticket.ticket_id,
                    error = %err,
                    "model analysis failed, falling back to rule-based classification"
                );
                rules::classify_by_rules(ticket)
            }
        }
    }

    pub fn act(
        &mut self,
        decision: Decision,
        triggered_by: TriggeredBy,
    ) -> Result<ActionResult, AgentError> {
        executor::act(&self.audit, &mut self.history, decision, triggered_by)
    }

    pub fn execute_approved_action(&mut self, ticket_id: &str) -> Result<ActionResult, AgentError> {
        executor::execute_approved_action(&self.audit, &mut self.history, ticket_id)
    }

    /// Full loop: observe once over the whole set, then classify, decide
    /// and act per ticket in input order.
    pub fn run_all(&mut self) -> Result<Vec<PipelineResult>, AgentError> {
        let tickets = self.tickets.load()?;
        if tickets.is_empty() {
            return Ok(Vec::new());
        }

        let patterns = observe(&tickets);
        info!(
            total = patterns.total_tickets,
            critical = patterns.critical_count,
            checkout_failures = patterns.total_checkout_failures,
            "observe phase complete"
        );

        let mut results = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let analysis = self.classify(&ticket, &patterns);
            let decision = decide(&ticket, &analysis);
            let action_result = self.act(decision.clone(), TriggeredBy::Auto)?;
            info!(
                ticket = %ticket.ticket_id,
                root_cause = analysis.root_cause.as_str(),
                action = decision.action.as_str(),
                status = ?action_result.status,
                "ticket processed"
            );
            results.push(PipelineResult {
                ticket,
                analysis,
                decision,
                action_result,
            });
        }

        info!(processed = results.len(), "pipeline run complete");
        Ok(results)
    }
}
