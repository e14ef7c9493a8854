use crate::analysis::Analysis;
use crate::observer::PatternSummary;
use crate::tickets::Ticket;
use futures::executor::block_on;
use rig::client::{completion::CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.2,
            max_retries: 3,
            initial_backoff_ms: 5000,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("malformed model response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Provider(String),
}

const PREAMBLE: &str =
    "You are an expert AI support agent analyzing e-commerce platform migration issues.";

/// Ask the model for a root-cause analysis of one ticket. Rate limits are
/// retried with capped exponential backoff; everything else is returned to
/// the caller, which falls back to the rule strategy.
pub fn analyze(
    config: &LlmConfig,
    ticket: &Ticket,
    patterns: &PatternSummary,
) -> Result<Analysis, LlmError> {
    let prompt = build_prompt(ticket, patterns);
    let mut delay = Duration::from_millis(config.initial_backoff_ms);
    let mut attempt = 0u32;

    loop {
        match run_prompt(config, &prompt) {
            Ok(raw) => {
                let value = extract_json(&raw).map_err(LlmError::Malformed)?;
                return Analysis::from_model_json(&value, ticket.severity)
                    .map_err(LlmError::Malformed);
            }
            Err(LlmError::RateLimited(msg)) if attempt < config.max_retries => {
                attempt += 1;
                warn!(
                    ticket = %ticket.ticket_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off: {msg}"
                );
                std::thread::sleep(delay);
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

fn build_prompt(ticket: &Ticket, patterns: &PatternSummary) -> String {
    format!(
        "TICKET INFORMATION:\n\
         - Ticket ID: {}\n\
         - Merchant ID: {}\n\
         - Issue: {}\n\
         - Merchant Message: {}\n\
         - Error Log: {}\n\
         - Migration Stage: {}\n\
         - Severity: {}\n\
         - Checkout Failures: {}\n\
         - Affected Customers: {}\n\
         \n\
         SYSTEM-WIDE PATTERNS DETECTED:\n\
         - Total tickets in system: {}\n\
         - Error type frequency: {}\n\
         - Critical severity tickets: {}\n\
         - Migration stage distribution: {}\n\
         - Total checkout failures across all tickets: {}\n\
         \n\
         ANALYSIS REQUIRED:\n\
         1. ROOT CAUSE: Determine if this is:\n\
            - \"webhook_configuration\" (merchant didn't update webhook URLs/endpoints)\n\
            - \"platform_bug\" (platform code regression or bug)\n\
            - \"migration_issue\" (data migration or process problem)\n\
            - \"documentation_gap\" (unclear migration instructions)\n\
         2. PATTERN DETECTION: Is this isolated or affecting multiple merchants?\n\
         3. CONFIDENCE: Rate your confidence 0-100 based on evidence:\n\
            85-100 the log directly states the cause; 70-84 strong correlation;\n\
            55-69 educated guess; 40-54 multiple plausible causes; below 40 highly uncertain.\n\
         4. ASSUMPTIONS: What are you assuming to reach this conclusion?\n\
         \n\
         Respond ONLY with valid JSON (no markdown, no code blocks):\n\
         {{\n\
             \"root_cause\": \"one of the four options above\",\n\
             \"root_cause_explanation\": \"2-3 sentence detailed explanation\",\n\
             \"is_pattern\": true,\n\
             \"pattern_details\": \"if pattern detected, explain it and how many merchants affected\",\n\
             \"confidence\": 85,\n\
             \"assumptions\": [\"assumption 1\", \"assumption 2\"],\n\
             \"affected_merchants\": 1,\n\
             \"recommended_priority\": \"low/medium/high/critical\"\n\
         }}",
        ticket.ticket_id,
        ticket.merchant_id,
        ticket.issue,
        ticket.merchant_message,
        ticket.error_log,
        ticket.migration_stage,
        ticket.severity.as_str(),
        ticket.checkout_failures,
        ticket.affected_customers,
        patterns.total_tickets,
        serde_json::to_string(&patterns.error_patterns).unwrap_or_default(),
        patterns.critical_count,
        serde_json::to_string(&patterns.migration_stages).unwrap_or_default(),
        patterns.total_checkout_failures,
    )
}

fn run_prompt(config: &LlmConfig, prompt: &str) -> Result<String, LlmError> {
    if config.provider.to_lowercase() != "openai" {
        return Err(LlmError::Provider(format!(
            "unsupported llm provider '{}'",
            config.provider
        )));
    }

    let client = if config.api_key_env == "OPENAI_API_KEY" {
        openai::Client::from_env()
    } else {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::Provider(format!("missing env var {}", config.api_key_env)))?;
        openai::Client::new(&api_key)
            .map_err(|e| LlmError::Provider(format!("openai client error: {e}")))?
    };

    let agent = client
        .agent(&config.model)
        .preamble(PREAMBLE)
        .temperature(config.temperature)
        .build();

    let fut = agent.prompt(prompt).into_future();
    let out: Result<String, _> = block_on(fut);
    out.map_err(|e| classify_prompt_error(&e.to_string()))
}

/// Rate limiting is the only transient condition worth retrying; the
/// provider surfaces it as a 429 or a RESOURCE_EXHAUSTED status.
fn classify_prompt_error(message: &str) -> LlmError {
    let lower = message.to_lowercase();
    if message.contains("429") || message.contains("RESOURCE_EXHAUSTED") || lower.contains("rate limit")
    {
        LlmError::RateLimited(message.to_string())
    } else {
        LlmError::Provider(format!("llm prompt failed: {message}"))
    }
}

/// Repair a model response into one JSON object: strip code fences, then
/// parse the substring between the first `{` and the last `}`.
fn extract_json(raw: &str) -> Result<serde_json::Value, String> {
    let mut text = raw.trim();
    text = text.strip_prefix("```json").unwrap_or(text);
    text = text.strip_prefix("```").unwrap_or(text);
    text = text.strip_suffix("```").unwrap_or(text);
    let text = text.trim();

    let start = text.find('{').ok_or_else(|| "no JSON object in response".to_string())?;
    let end = text.rfind('}').ok_or_else(|| "no JSON object in response".to_string())?;
    if end < start {
        return Err("no JSON object in response".into());
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| format!("invalid analysis json: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_json() {
        let value = extract_json(r#"{"root_cause":"platform_bug","confidence":65}"#).expect("parse");
        assert_eq!(
            value.get("root_cause").and_then(serde_json::Value::as_str),
            Some("platform_bug")
        );
    }

    #[test]
    fn strips_code_fences() {
        let raw = "```json\n{\"root_cause\":\"migration_issue\",\"confidence\":70}\n```";
        let value = extract_json(raw).expect("parse");
        assert_eq!(
            value.get("confidence").and_then(serde_json::Value::as_u64),
            Some(70)
        );
    }

    #[test]
    fn recovers_object_embedded_in_prose() {
        let raw = "Sure, here is the analysis: {\"root_cause\":\"documentation_gap\",\"confidence\":55} Hope that helps!";
        let value = extract_json(raw).expect("parse");
        assert_eq!(
            value.get("root_cause").and_then(serde_json::Value::as_str),
            Some("documentation_gap")
        );
    }

    #[test]
    fn response_without_braces_is_malformed() {
        assert!(extract_json("I could not determine the root cause.").is_err());
    }

    #[test]
    fn unbalanced_braces_are_malformed() {
        assert!(extract_json("} oops {").is_err());
    }

    #[test]
    fn rate_limit_errors_are_classified_transient() {
        assert!(matches!(
            classify_prompt_error("HTTP 429 Too Many Requests"),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            classify_prompt_error("status RESOURCE_EXHAUSTED"),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            classify_prompt_error("connection refused"),
            LlmError::Provider(_)
        ));
    }
}
