use serde_json::Value;

use crate::core::error::TriageError;
use crate::core::types::ThreatAnalysis;
use crate::pipeline::fallback::classify;

/// Normalize a raw workflow response body into a canonical record.
///
/// The workflow returns one of three shapes: the analysis object itself, the
/// analysis wrapped as an escaped string under a `response` field, or a raw
/// unprocessed webhook envelope. The checks below run in that fixed order;
/// they were reverse-engineered against live workflow output and must not be
/// generalized.
pub fn normalize(raw_body: &str) -> Result<ThreatAnalysis, TriageError> {
    let value: Value = serde_json::from_str(raw_body)
        .map_err(|err| TriageError::InvalidOuterJson(err.to_string()))?;
    normalize_value(value)
}

/// Entry point for callers that already hold a decoded body.
pub fn normalize_value(mut value: Value) -> Result<ThreatAnalysis, TriageError> {
    let nested = value
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(nested) = nested {
        tracing::debug!("found nested JSON in response field");
        let cleaned = clean_nested_json(&nested);
        value = serde_json::from_str(&cleaned)
            .map_err(|_| TriageError::InvalidNestedJson { raw: nested })?;
    }

    if is_raw_envelope(&value) {
        tracing::debug!("raw webhook envelope detected, using keyword fallback");
        return Ok(classify(&envelope_log_text(&value)));
    }

    // the workflow misnames the MITRE URL field with an ampersand
    if let Some(obj) = value.as_object_mut() {
        if let Some(url) = obj.remove("mitre_att&ck_url") {
            obj.insert("mitre_attck_url".to_string(), url);
        }
    }

    if value.get("threat_score").is_none() && value.get("cause").is_none() {
        return Err(TriageError::MissingAnalysisFields);
    }

    Ok(ThreatAnalysis::from_value(&value))
}

/// The nested document arrives with literal `\n`/`\t` sequences and escaped
/// quotes baked into the string; strip them before the second parse.
fn clean_nested_json(raw: &str) -> String {
    raw.replace("\\n", "")
        .replace("\\t", "")
        .replace("\\\"", "\"")
        .trim()
        .to_string()
}

/// A response that still looks like the unprocessed webhook envelope: a
/// `body` field, executionMode == "test", and no threat_score.
fn is_raw_envelope(value: &Value) -> bool {
    value.get("body").is_some()
        && value.get("executionMode").and_then(Value::as_str) == Some("test")
        && value.get("threat_score").is_none()
}

fn envelope_log_text(value: &Value) -> String {
    let body = &value["body"];
    if let Some(log) = body.get("log").and_then(Value::as_str) {
        return log.to_string();
    }
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_cleanup_strips_escapes_and_trims() {
        let raw = "  {\\n\\t\\\"threat_score\\\": 50}  ";
        assert_eq!(clean_nested_json(raw), "{\"threat_score\": 50}");
    }

    #[test]
    fn envelope_requires_test_execution_mode() {
        let with_mode = serde_json::json!({ "body": { "log": "x" }, "executionMode": "test" });
        let wrong_mode = serde_json::json!({ "body": { "log": "x" }, "executionMode": "prod" });
        let with_score =
            serde_json::json!({ "body": {}, "executionMode": "test", "threat_score": 10 });
        assert!(is_raw_envelope(&with_mode));
        assert!(!is_raw_envelope(&wrong_mode));
        assert!(!is_raw_envelope(&with_score));
    }

    #[test]
    fn envelope_log_text_prefers_body_log() {
        let nested = serde_json::json!({ "body": { "log": "failed login" } });
        assert_eq!(envelope_log_text(&nested), "failed login");

        let plain = serde_json::json!({ "body": "raw text" });
        assert_eq!(envelope_log_text(&plain), "raw text");
    }
}
