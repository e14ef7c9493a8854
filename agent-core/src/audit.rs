use crate::decision::{ActionKind, RiskLevel};
use crate::error::AgentError;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    PendingApproval,
    Executed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggeredBy {
    Auto,
    System,
    Human,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Option<i64>,
    pub timestamp: String,
    pub ticket_id: String,
    pub action: ActionKind,
    pub status: ActionStatus,
    pub risk_level: RiskLevel,
    pub triggered_by: TriggeredBy,
    pub message: String,
}

/// Append-only audit trail backed by SQLite. Entries are never updated;
/// the only destructive operation is an explicit clear-all.
#[derive(Clone)]
pub struct AuditLog {
    db_path: Arc<PathBuf>,
}

impl AuditLog {
    pub fn open(path: &str) -> Result<Self, AgentError> {
        let db_path = PathBuf::from(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS audit_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                ticket_id TEXT NOT NULL,
                action TEXT NOT NULL,
                status TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                triggered_by TEXT NOT NULL,
                message TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_ticket ON audit_entries(ticket_id);
            ",
        )?;

        Ok(Self {
            db_path: Arc::new(db_path),
        })
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<i64, AgentError> {
        let conn = Connection::open(&*self.db_path)?;
        conn.execute(
            "INSERT INTO audit_entries
                 (timestamp, ticket_id, action, status, risk_level, triggered_by, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.timestamp,
                entry.ticket_id,
                serde_json::to_string(&entry.action)?,
                serde_json::to_string(&entry.status)?,
                serde_json::to_string(&entry.risk_level)?,
                serde_json::to_string(&entry.triggered_by)?,
                entry.message,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn entries(&self) -> Result<Vec<AuditEntry>, AgentError> {
        let conn = Connection::open(&*self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, ticket_id, action, status, risk_level, triggered_by, message
             FROM audit_entries
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], map_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn entries_for_ticket(&self, ticket_id: &str) -> Result<Vec<AuditEntry>, AgentError> {
        let conn = Connection::open(&*self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, ticket_id, action, status, risk_level, triggered_by, message
             FROM audit_entries
             WHERE ticket_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![ticket_id], map_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn clear(&self) -> Result<(), AgentError> {
        let conn = Connection::open(&*self.db_path)?;
        conn.execute("DELETE FROM audit_entries", [])?;
        Ok(())
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    fn decode<T: serde::de::DeserializeOwned>(idx: usize, raw: String) -> rusqlite::Result<T> {
        serde_json::from_str(&raw).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
        })
    }

    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        ticket_id: row.get(2)?,
        action: decode(3, row.get::<_, String>(3)?)?,
        status: decode(4, row.get::<_, String>(4)?)?,
        risk_level: decode(5, row.get::<_, String>(5)?)?,
        triggered_by: decode(6, row.get::<_, String>(6)?)?,
        message: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_path(name: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        format!("/tmp/migration-agent-tests/{name}-{nanos}.db")
    }

    fn entry(ticket_id: &str, status: ActionStatus, triggered_by: TriggeredBy) -> AuditEntry {
        AuditEntry {
            id: None,
            timestamp: "2026-08-24T10:00:00+00:00".into(),
            ticket_id: ticket_id.into(),
            action: ActionKind::EscalateToEngineering,
            status,
            risk_level: RiskLevel::High,
            triggered_by,
            message: "escalation pending".into(),
        }
    }

    #[test]
    fn append_and_read_round_trip() {
        let log = AuditLog::open(&db_path("roundtrip")).expect("open");
        let id = log
            .append(&entry("T001", ActionStatus::PendingApproval, TriggeredBy::System))
            .expect("append");
        assert!(id > 0);

        let entries = log.entries().expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticket_id, "T001");
        assert_eq!(entries[0].status, ActionStatus::PendingApproval);
        assert_eq!(entries[0].triggered_by, TriggeredBy::System);
        assert_eq!(entries[0].action, ActionKind::EscalateToEngineering);
    }

    #[test]
    fn entries_preserve_insertion_order() {
        let log = AuditLog::open(&db_path("order")).expect("open");
        log.append(&entry("T001", ActionStatus::PendingApproval, TriggeredBy::System))
            .expect("append");
        log.append(&entry("T001", ActionStatus::Executed, TriggeredBy::Human))
            .expect("append");

        let entries = log.entries().expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, ActionStatus::PendingApproval);
        assert_eq!(entries[1].status, ActionStatus::Executed);
    }

    #[test]
    fn entries_for_ticket_filters() {
        let log = AuditLog::open(&db_path("filter")).expect("open");
        log.append(&entry("T001", ActionStatus::Executed, TriggeredBy::Auto))
            .expect("append");
        log.append(&entry("T002", ActionStatus::Executed, TriggeredBy::Auto))
            .expect("append");

        let entries = log.entries_for_ticket("T002").expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticket_id, "T002");
    }

    #[test]
    fn clear_empties_the_log() {
        let log = AuditLog::open(&db_path("clear")).expect("open");
        log.append(&entry("T001", ActionStatus::Executed, TriggeredBy::Auto))
            .expect("append");
        log.clear().expect("clear");
        assert!(log.entries().expect("entries").is_empty());
    }
}
