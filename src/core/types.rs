use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical assessment record produced by the normalizer. The wire field
/// names match what the n8n workflow emits, so stored documents stay
/// interchangeable with the original dashboard exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreatAnalysis {
    #[serde(default)]
    pub threat_score: u8,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub remedy: String,
    #[serde(default)]
    pub mitre_technique: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitre_attck_url: Option<String>,
    #[serde(default)]
    pub approach: Vec<String>,
    /// True when the record was synthesized by the keyword fallback rather
    /// than returned by the workflow. Mock records are never persisted.
    #[serde(default)]
    pub mock: bool,
}

impl ThreatAnalysis {
    /// Lenient extraction from an upstream JSON value. The workflow output is
    /// not schema-checked beyond the threat_score/cause presence gate, so a
    /// missing or mistyped field defaults instead of failing the whole record.
    pub fn from_value(value: &Value) -> Self {
        let approach = match value.get("approach") {
            // a single string is treated as a one-element sequence
            Some(Value::String(step)) => vec![step.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(step) => step.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            threat_score: value
                .get("threat_score")
                .and_then(Value::as_u64)
                .map(|n| n.min(100) as u8)
                .unwrap_or(0),
            cause: text_field(value, "cause"),
            remedy: text_field(value, "remedy"),
            mitre_technique: text_field(value, "mitre_technique"),
            mitre_attck_url: value
                .get("mitre_attck_url")
                .and_then(Value::as_str)
                .map(str::to_string),
            approach,
            mock: value.get("mock").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_score(self.threat_score)
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Band derived solely from the threat score: Low <= 30, Medium 31-60,
/// High 61-100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_score(score: u8) -> Self {
        if score <= 30 {
            Severity::Low
        } else if score <= 60 {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(label)
    }
}

/// One persisted analysis. Entries are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "logInput")]
    pub log_input: String,
    pub analysis: ThreatAnalysis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub average_score: u32,
    pub high_threats: usize,
    pub medium_threats: usize,
    pub low_threats: usize,
    pub top_techniques: Vec<TechniqueCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechniqueCount {
    pub technique: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Timestamp,
    ThreatScore,
    Technique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}
