use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Severity> {
        match value.to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub merchant_id: String,
    pub issue: String,
    pub merchant_message: String,
    pub error_log: String,
    pub migration_stage: String,
    pub severity: Severity,
    #[serde(default)]
    pub checkout_failures: u32,
    #[serde(default)]
    pub affected_customers: u32,
}

/// Persisted ticket source: a JSON array read wholesale before each run.
#[derive(Clone)]
pub struct TicketStore {
    path: PathBuf,
}

impl TicketStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<Ticket>, AgentError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, tickets: &[Ticket]) -> Result<(), AgentError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(tickets)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn find(&self, ticket_id: &str) -> Result<Option<Ticket>, AgentError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|t| t.ticket_id == ticket_id))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(name: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        format!("/tmp/migration-agent-tests/{name}-{nanos}.json")
    }

    fn sample_ticket() -> Ticket {
        Ticket {
            ticket_id: "T001".into(),
            merchant_id: "M482".into(),
            issue: "Orders not processing - webhook timeout".into(),
            merchant_message: "Checkout completely broken since migration".into(),
            error_log: "WebhookTimeout: order.created webhook failed after 30s".into(),
            migration_stage: "post-migration-day-1".into(),
            severity: Severity::Critical,
            checkout_failures: 57,
            affected_customers: 31,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = TicketStore::new(store_path("roundtrip"));
        let tickets = vec![sample_ticket()];
        store.save(&tickets).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded, tickets);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let store = TicketStore::new(store_path("missing"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn find_by_ticket_id() {
        let store = TicketStore::new(store_path("find"));
        store.save(&[sample_ticket()]).expect("save");

        let found = store.find("T001").expect("find");
        assert_eq!(found.map(|t| t.merchant_id), Some("M482".to_string()));
        assert!(store.find("T999").expect("find").is_none());
    }

    #[test]
    fn severity_serializes_lowercase() {
        let raw = serde_json::to_string(&Severity::Critical).expect("serialize");
        assert_eq!(raw, "\"critical\"");
        let parsed: Severity = serde_json::from_str("\"medium\"").expect("deserialize");
        assert_eq!(parsed, Severity::Medium);
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let path = store_path("corrupt");
        std::fs::create_dir_all("/tmp/migration-agent-tests").expect("mkdir");
        std::fs::write(&path, "{not json").expect("write");
        let store = TicketStore::new(path);
        assert!(store.load().is_err());
    }
}
