use crate::tickets::Severity;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCause {
    WebhookConfiguration,
    PlatformBug,
    MigrationIssue,
    DocumentationGap,
    Unknown,
}

impl RootCause {
    /// Labels the model is allowed to return. `Unknown` is deliberately not
    /// accepted here: a response outside the four prompt labels is treated
    /// as malformed so the caller falls back to the rule strategy.
    pub fn from_label(label: &str) -> Option<RootCause> {
        match label {
            "webhook_configuration" => Some(RootCause::WebhookConfiguration),
            "platform_bug" => Some(RootCause::PlatformBug),
            "migration_issue" => Some(RootCause::MigrationIssue),
            "documentation_gap" => Some(RootCause::DocumentationGap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RootCause::WebhookConfiguration => "webhook_configuration",
            RootCause::PlatformBug => "platform_bug",
            RootCause::MigrationIssue => "migration_issue",
            RootCause::DocumentationGap => "documentation_gap",
            RootCause::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub root_cause: RootCause,
    pub root_cause_explanation: String,
    pub is_pattern: bool,
    #[serde(default)]
    pub pattern_details: String,
    pub confidence: u8,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default = "default_affected_merchants")]
    pub affected_merchants: u32,
    pub recommended_priority: Severity,
}

fn default_affected_merchants() -> u32 {
    1
}

impl Analysis {
    /// Coerce a parsed model response into an analysis. Optional fields get
    /// defaults; `root_cause` and `confidence` are load-bearing and a
    /// missing or mistyped value makes the whole response malformed.
    pub fn from_model_json(
        value: &serde_json::Value,
        fallback_priority: Severity,
    ) -> Result<Analysis, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "response is not a JSON object".to_string())?;

        let label = obj
            .get("root_cause")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| "missing root_cause".to_string())?;
        let root_cause = RootCause::from_label(label)
            .ok_or_else(|| format!("unrecognized root_cause '{label}'"))?;

        let confidence = obj
            .get("confidence")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| "missing confidence".to_string())?
            .min(100) as u8;

        let assumptions = obj
            .get("assumptions")
            .and_then(serde_json::Value::as_array)
            .map(|xs| {
                xs.iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Analysis {
            root_cause,
            root_cause_explanation: obj
                .get("root_cause_explanation")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_pattern: obj
                .get("is_pattern")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            pattern_details: obj
                .get("pattern_details")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            confidence,
            assumptions,
            affected_merchants: obj
                .get("affected_merchants")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(1)
                .max(1) as u32,
            recommended_priority: obj
                .get("recommended_priority")
                .and_then(serde_json::Value::as_str)
                .and_then(Severity::parse)
                .unwrap_or(fallback_priority),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_full_response() {
        let raw = serde_json::json!({
            "root_cause": "webhook_configuration",
            "root_cause_explanation": "Endpoint still points at the legacy URL.",
            "is_pattern": true,
            "pattern_details": "4 merchants with the same timeout",
            "confidence": 88,
            "assumptions": ["webhook URL unchanged since migration"],
            "affected_merchants": 4,
            "recommended_priority": "high"
        });
        let analysis = Analysis::from_model_json(&raw, Severity::Medium).expect("coerce");

        assert_eq!(analysis.root_cause, RootCause::WebhookConfiguration);
        assert!(analysis.is_pattern);
        assert_eq!(analysis.confidence, 88);
        assert_eq!(analysis.affected_merchants, 4);
        assert_eq!(analysis.recommended_priority, Severity::High);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let raw = serde_json::json!({
            "root_cause": "documentation_gap",
            "confidence": 60
        });
        let analysis = Analysis::from_model_json(&raw, Severity::Low).expect("coerce");

        assert!(!analysis.is_pattern);
        assert_eq!(analysis.pattern_details, "");
        assert!(analysis.assumptions.is_empty());
        assert_eq!(analysis.affected_merchants, 1);
        assert_eq!(analysis.recommended_priority, Severity::Low);
    }

    #[test]
    fn unrecognized_root_cause_is_malformed() {
        let raw = serde_json::json!({"root_cause": "cosmic_rays", "confidence": 90});
        assert!(Analysis::from_model_json(&raw, Severity::Medium).is_err());
    }

    #[test]
    fn missing_confidence_is_malformed() {
        let raw = serde_json::json!({"root_cause": "platform_bug"});
        assert!(Analysis::from_model_json(&raw, Severity::Medium).is_err());
    }

    #[test]
    fn confidence_clamped_and_merchants_floored() {
        let raw = serde_json::json!({
            "root_cause": "platform_bug",
            "confidence": 400,
            "affected_merchants": 0
        });
        let analysis = Analysis::from_model_json(&raw, Severity::Medium).expect("coerce");
        assert_eq!(analysis.confidence, 100);
        assert_eq!(analysis.affected_merchants, 1);
    }
}
