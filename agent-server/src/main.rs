use agent_core::agent::Agent;
use agent_core::audit::AuditLog;
use agent_core::llm::LlmConfig;
use agent_core::tickets::TicketStore;
use agent_server::api::{self, AppState};
use std::sync::{Arc, Mutex};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let tickets_path =
        std::env::var("TICKETS_PATH").unwrap_or_else(|_| "data/tickets.json".into());
    let audit_path =
        std::env::var("AUDIT_DB_PATH").unwrap_or_else(|_| "data/audit_log.db".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let audit = AuditLog::open(&audit_path).expect("open audit log");
    let llm = build_llm_config_from_env();
    if llm.is_none() {
        info!("no model credentials configured, using rule-based classification only");
    }

    let agent = Agent::new(TicketStore::new(tickets_path), audit, llm);
    let state = AppState {
        agent: Arc::new(Mutex::new(agent)),
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("bind address");

    info!(%bind_addr, "agent-server listening");
    axum::serve(listener, app).await.expect("serve");
}

fn build_llm_config_from_env() -> Option<LlmConfig> {
    let api_key_env =
        std::env::var("LLM_API_KEY_ENV").unwrap_or_else(|_| "OPENAI_API_KEY".into());
    if std::env::var(&api_key_env).is_err() {
        return None;
    }

    let defaults = LlmConfig::default();
    Some(LlmConfig {
        provider: std::env::var("LLM_PROVIDER").unwrap_or(defaults.provider),
        model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
        api_key_env,
        temperature: std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(defaults.temperature),
        max_retries: std::env::var("LLM_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.max_retries),
        initial_backoff_ms: std::env::var("LLM_INITIAL_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.initial_backoff_ms),
    })
}
