use agent_core::agent::{Agent, PipelineResult};
use agent_core::analysis::Analysis;
use agent_core::audit::TriggeredBy;
use agent_core::decision::{decide, Decision};
use agent_core::error::AgentError;
use agent_core::observer::{observe, PatternSummary};
use agent_core::tickets::{Severity, Ticket};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use ticket_registry::{validate_ticket_v1, CanonicalTicketV1};

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Mutex<Agent>>,
}

type ApiResponse = (StatusCode, Json<Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-tickets", post(generate_tickets))
        .route("/api/tickets", get(list_tickets))
        .route("/api/ticket/:ticket_id", get(get_ticket))
        .route("/api/observe", post(observe_patterns))
        .route("/api/analyze", post(analyze_ticket))
        .route("/api/decide", post(make_decision))
        .route("/api/execute", post(execute_action))
        .route("/api/process-all", post(process_all))
        .route("/api/approve", post(approve_action))
        .route("/api/audit-log", get(get_audit_log))
        .route("/api/clear-audit-log", post(clear_audit_log))
        .with_state(state)
}

async fn health() -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "status": "healthy",
            "message": "agent-server is running"
        })),
    )
}

async fn generate_tickets(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResponse {
    let count = payload.get("count").and_then(Value::as_u64).unwrap_or(10) as usize;
    let force_patterns = payload
        .get("force_patterns")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let tickets = crate::generator::generate_tickets(count, force_patterns);

    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    if let Err(e) = agent.ticket_store().save(&tickets) {
        return agent_error(&e);
    }

    match serde_json::to_value(&tickets) {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Generated {} new tickets", tickets.len()),
                "data": data,
                "count": tickets.len()
            })),
        ),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn list_tickets(State(state): State<AppState>) -> ApiResponse {
    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.ticket_store().load() {
        Ok(tickets) => ok_with_count(&tickets, tickets.len()),
        Err(e) => agent_error(&e),
    }
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> ApiResponse {
    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.ticket_store().find(&ticket_id) {
        Ok(Some(ticket)) => ok(&ticket),
        Ok(None) => error(
            StatusCode::NOT_FOUND,
            format!("Ticket {ticket_id} not found"),
        ),
        Err(e) => agent_error(&e),
    }
}

async fn observe_patterns(State(state): State<AppState>) -> ApiResponse {
    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.ticket_store().load() {
        Ok(tickets) => ok(&observe(&tickets)),
        Err(e) => agent_error(&e),
    }
}

async fn analyze_ticket(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResponse {
    let ticket = match parse_ticket(payload.get("ticket").unwrap_or(&Value::Null)) {
        Ok(ticket) => ticket,
        Err(e) => return agent_error(&e),
    };
    let patterns = match payload.get("patterns") {
        Some(value) if !value.is_null() => {
            match serde_json::from_value::<PatternSummary>(value.clone()) {
                Ok(patterns) => patterns,
                Err(e) => {
                    return error(StatusCode::BAD_REQUEST, format!("invalid patterns: {e}"))
                }
            }
        }
        _ => PatternSummary::default(),
    };

    // Classification may block on the model call, so it runs off the
    // async runtime.
    let agent = state.agent.clone();
    let task = tokio::task::spawn_blocking(move || -> Result<Analysis, String> {
        let guard = agent.lock().map_err(|_| "agent state poisoned".to_string())?;
        Ok(guard.classify(&ticket, &patterns))
    })
    .await;

    match task {
        Ok(Ok(analysis)) => ok(&analysis),
        Ok(Err(message)) => internal_error(message),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn make_decision(Json(payload): Json<Value>) -> ApiResponse {
    let ticket = match parse_ticket(payload.get("ticket").unwrap_or(&Value::Null)) {
        Ok(ticket) => ticket,
        Err(e) => return agent_error(&e),
    };
    let analysis: Analysis =
        match serde_json::from_value(payload.get("analysis").cloned().unwrap_or(Value::Null)) {
            Ok(analysis) => analysis,
            Err(e) => return error(StatusCode::BAD_REQUEST, format!("invalid analysis: {e}")),
        };

    ok(&decide(&ticket, &analysis))
}

async fn execute_action(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResponse {
    let decision: Decision =
        match serde_json::from_value(payload.get("decision").cloned().unwrap_or(Value::Null)) {
            Ok(decision) => decision,
            Err(e) => return error(StatusCode::BAD_REQUEST, format!("invalid decision: {e}")),
        };

    let mut agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.act(decision, TriggeredBy::Auto) {
        Ok(result) => ok(&result),
        Err(e) => agent_error(&e),
    }
}

async fn process_all(State(state): State<AppState>) -> ApiResponse {
    let agent = state.agent.clone();
    let task = tokio::task::spawn_blocking(
        move || -> Result<Vec<PipelineResult>, (StatusCode, String)> {
            let mut guard = agent.lock().map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "agent state poisoned".to_string(),
                )
            })?;
            guard
                .run_all()
                .map_err(|e| (status_for(&e), e.to_string()))
        },
    )
    .await;

    match task {
        Ok(Ok(results)) => ok_with_count(&results, results.len()),
        Ok(Err((status, message))) => error(status, message),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn approve_action(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResponse {
    let Some(ticket_id) = payload
        .get("ticket_id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
    else {
        return error(StatusCode::BAD_REQUEST, "ticket_id is required".into());
    };

    let mut agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.execute_approved_action(&ticket_id) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(data) => (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!("Action for {ticket_id} approved and executed"),
                    "data": data
                })),
            ),
            Err(e) => internal_error(e.to_string()),
        },
        Err(e) => agent_error(&e),
    }
}

async fn get_audit_log(State(state): State<AppState>) -> ApiResponse {
    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.audit_log().entries() {
        Ok(entries) => ok_with_count(&entries, entries.len()),
        Err(e) => agent_error(&e),
    }
}

async fn clear_audit_log(State(state): State<AppState>) -> ApiResponse {
    let agent = match lock_agent(&state) {
        Ok(agent) => agent,
        Err(resp) => return resp,
    };
    match agent.audit_log().clear() {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"success": true, "message": "Audit log cleared"})),
        ),
        Err(e) => agent_error(&e),
    }
}

/// Validate a raw ticket payload and convert it into the core model.
fn parse_ticket(payload: &Value) -> Result<Ticket, AgentError> {
    let canonical: CanonicalTicketV1 = serde_json::from_value(payload.clone())
        .map_err(|e| AgentError::Validation(e.to_string()))?;
    validate_ticket_v1(&canonical).map_err(AgentError::Validation)?;
    let severity = Severity::parse(&canonical.severity)
        .ok_or_else(|| AgentError::Validation(format!("invalid severity '{}'", canonical.severity)))?;

    Ok(Ticket {
        ticket_id: canonical.ticket_id,
        merchant_id: canonical.merchant_id,
        issue: canonical.issue,
        merchant_message: canonical.merchant_message,
        error_log: canonical.error_log,
        migration_stage: canonical.migration_stage,
        severity,
        checkout_failures: canonical.checkout_failures,
        affected_customers: canonical.affected_customers,
    })
}

fn lock_agent(state: &AppState) -> Result<std::sync::MutexGuard<'_, Agent>, ApiResponse> {
    state
        .agent
        .lock()
        .map_err(|_| internal_error("agent state poisoned".to_string()))
}

fn status_for(err: &AgentError) -> StatusCode {
    match err {
        AgentError::NotFound(_) => StatusCode::NOT_FOUND,
        AgentError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn agent_error(err: &AgentError) -> ApiResponse {
    error(status_for(err), err.to_string())
}

fn ok<T: serde::Serialize>(data: &T) -> ApiResponse {
    match serde_json::to_value(data) {
        Ok(value) => (
            StatusCode::OK,
            Json(json!({"success": true, "data": value})),
        ),
        Err(e) => internal_error(e.to_string()),
    }
}

fn ok_with_count<T: serde::Serialize>(data: &T, count: usize) -> ApiResponse {
    match serde_json::to_value(data) {
        Ok(value) => (
            StatusCode::OK,
            Json(json!({"success": true, "data": value, "count": count})),
        ),
        Err(e) => internal_error(e.to_string()),
    }
}

fn error(status: StatusCode, message: String) -> ApiResponse {
    (status, Json(json!({"success": false, "error": message})))
}

fn internal_error(message: String) -> ApiResponse {
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
