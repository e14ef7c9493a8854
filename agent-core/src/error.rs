use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No pending approval found for ticket {0}")]
    NotFound(String),
    #[error("invalid ticket payload: {0}")]
    Validation(String),
    #[error("audit store error: {0}")]
    Audit(#[from] rusqlite::Error),
    #[error("ticket store error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed persisted data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
