use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::core::time::now_utc;
use crate::core::types::{HistoryEntry, Statistics, ThreatAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
}

pub fn render_analysis(analysis: &ThreatAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Threat score: {}/100 ({})\n",
        analysis.threat_score,
        analysis.severity()
    ));
    out.push_str(&format!("Cause: {}\n", analysis.cause));
    out.push_str(&format!("Remedy: {}\n", analysis.remedy));
    out.push_str(&format!("MITRE ATT&CK: {}\n", analysis.mitre_technique));
    if let Some(url) = &analysis.mitre_attck_url {
        out.push_str(&format!("Reference: {}\n", url));
    }
    if !analysis.approach.is_empty() {
        out.push_str("Approach:\n");
        for step in &analysis.approach {
            out.push_str(&format!("  - {}\n", step));
        }
    }
    if analysis.mock {
        out.push_str(
            "Note: keyword-based mock analysis; connect the workflow's AI nodes for a real assessment.\n",
        );
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No stored analyses.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{}  {}  score={:<3} {:<6} {}\n",
            entry.id,
            entry.timestamp.to_rfc3339(),
            entry.analysis.threat_score,
            entry.analysis.severity().to_string(),
            entry.analysis.mitre_technique
        ));
    }
    out
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total analyses: {}\n", stats.total));
    out.push_str(&format!("Average score: {}\n", stats.average_score));
    out.push_str(&format!("High threats (>60): {}\n", stats.high_threats));
    out.push_str(&format!(
        "Medium threats (31-60): {}\n",
        stats.medium_threats
    ));
    out.push_str(&format!("Low threats (<=30): {}\n", stats.low_threats));
    if stats.top_techniques.is_empty() {
        out.push_str("Top techniques: none\n");
    } else {
        out.push_str("Top techniques:\n");
        for tc in &stats.top_techniques {
            out.push_str(&format!("  {} ({})\n", tc.technique, tc.count));
        }
    }
    out
}

#[derive(Serialize)]
struct ReportBundle<'a> {
    generated: String,
    statistics: &'a Statistics,
    entries: &'a [HistoryEntry],
}

pub fn write_report(
    entries: &[HistoryEntry],
    stats: &Statistics,
    format: ReportFormat,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match format {
        ReportFormat::Json => {
            let bundle = ReportBundle {
                generated: now_utc().to_rfc3339(),
                statistics: stats,
                entries,
            };
            fs::write(path, serde_json::to_string_pretty(&bundle)?)?;
        }
        ReportFormat::Markdown => {
            fs::write(path, markdown_report(entries, stats))?;
        }
    }
    Ok(())
}

fn markdown_report(entries: &[HistoryEntry], stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str("# Threat Analysis Report\n\n");
    out.push_str(&format!("Generated: {}\n\n", now_utc().to_rfc3339()));

    out.push_str("## Statistics\n\n");
    out.push_str(&format!("- Total analyses: {}\n", stats.total));
    out.push_str(&format!("- Average score: {}\n", stats.average_score));
    out.push_str(&format!("- High threats (>60): {}\n", stats.high_threats));
    out.push_str(&format!(
        "- Medium threats (31-60): {}\n",
        stats.medium_threats
    ));
    out.push_str(&format!("- Low threats (<=30): {}\n", stats.low_threats));
    if !stats.top_techniques.is_empty() {
        out.push_str("- Top techniques:\n");
        for tc in &stats.top_techniques {
            out.push_str(&format!("  - {} ({})\n", tc.technique, tc.count));
        }
    }
    out.push('\n');

    out.push_str("## History\n\n");
    if entries.is_empty() {
        out.push_str("_No stored analyses._\n");
    }
    for entry in entries {
        out.push_str(&format!(
            "### {} — {} ({}/100)\n",
            entry.timestamp.to_rfc3339(),
            entry.analysis.severity(),
            entry.analysis.threat_score
        ));
        out.push_str(&format!(
            "- Technique: {}\n- Cause: {}\n- Remedy: {}\n",
            entry.analysis.mitre_technique, entry.analysis.cause, entry.analysis.remedy
        ));
        if !entry.analysis.approach.is_empty() {
            out.push_str("- Approach:\n");
            for step in &entry.analysis.approach {
                out.push_str(&format!("  - {}\n", step));
            }
        }
        out.push_str(&format!("- Log input: {}\n\n", entry.log_input));
    }
    out
}
