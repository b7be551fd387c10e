use serde_json::json;
use threat_triage::core::error::TriageError;
use threat_triage::core::types::{Severity, ThreatAnalysis};
use threat_triage::pipeline::fallback::classify;
use threat_triage::pipeline::normalizer::{normalize, normalize_value};

#[test]
fn canonical_input_normalizes_to_itself() {
    let record = ThreatAnalysis {
        threat_score: 50,
        cause: "Suspicious activity".to_string(),
        remedy: "Investigate".to_string(),
        mitre_technique: "T1078 - Valid Accounts".to_string(),
        mitre_attck_url: Some("https://attack.mitre.org/techniques/T1078/".to_string()),
        approach: vec!["Audit accounts".to_string(), "Rotate credentials".to_string()],
        mock: false,
    };
    let raw = serde_json::to_string(&record).unwrap();
    let normalized = normalize(&raw).unwrap();
    assert_eq!(normalized, record);
}

#[test]
fn nested_response_string_is_cleaned_and_parsed() {
    // the response field carries literal \n and \" sequences
    let nested = "{\\n  \\\"threat_score\\\": 50, \\\"cause\\\": \\\"x\\\"}";
    let raw = serde_json::to_string(&json!({ "response": nested })).unwrap();

    let analysis = normalize(&raw).unwrap();
    assert_eq!(analysis.threat_score, 50);
    assert_eq!(analysis.cause, "x");
}

#[test]
fn invalid_outer_json_is_rejected() {
    let err = normalize("not json at all").unwrap_err();
    assert!(matches!(err, TriageError::InvalidOuterJson(_)));
}

#[test]
fn invalid_nested_json_keeps_the_original_string() {
    let raw = serde_json::to_string(&json!({ "response": "still not json" })).unwrap();
    let err = normalize(&raw).unwrap_err();
    match err {
        TriageError::InvalidNestedJson { raw } => assert_eq!(raw, "still not json"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn ampersand_key_is_renamed_to_canonical() {
    let value = json!({
        "threat_score": 80,
        "cause": "c",
        "mitre_att&ck_url": "http://x"
    });
    let analysis = normalize_value(value).unwrap();
    assert_eq!(analysis.mitre_attck_url.as_deref(), Some("http://x"));
}

#[test]
fn missing_both_score_and_cause_is_rejected() {
    let err = normalize("{}").unwrap_err();
    assert!(matches!(err, TriageError::MissingAnalysisFields));
}

#[test]
fn null_cause_still_counts_as_present() {
    // null is a present field, unlike a missing key
    let analysis = normalize_value(json!({ "cause": null })).unwrap();
    assert_eq!(analysis.threat_score, 0);
    assert_eq!(analysis.cause, "");
}

#[test]
fn raw_webhook_envelope_falls_back_to_mock_analysis() {
    let value = json!({
        "body": { "log": "Failed login attempt for admin" },
        "executionMode": "test"
    });
    let analysis = normalize_value(value).unwrap();
    assert!(analysis.mock);
    assert_eq!(analysis.threat_score, 75);
    assert!(analysis.mitre_technique.starts_with("T1110.001"));
}

#[test]
fn envelope_without_log_field_classifies_the_body_itself() {
    let value = json!({ "body": "malware beacon observed", "executionMode": "test" });
    let analysis = normalize_value(value).unwrap();
    assert!(analysis.mock);
    assert_eq!(analysis.threat_score, 95);
}

#[test]
fn single_string_approach_becomes_one_element_sequence() {
    let value = json!({ "threat_score": 10, "cause": "c", "approach": "single step" });
    let analysis = normalize_value(value).unwrap();
    assert_eq!(analysis.approach, vec!["single step".to_string()]);
}

#[test]
fn classifier_is_deterministic_and_case_insensitive() {
    let first = classify("Failed login attempt for admin");
    let second = classify("Failed login attempt for admin");
    assert_eq!(first, second);
    assert_eq!(first.threat_score, 75);
    assert!(first.mitre_technique.starts_with("T1110.001"));
    assert!(first.mock);

    assert_eq!(classify("MALWARE QUARANTINED").threat_score, 95);
}

#[test]
fn classifier_falls_through_to_generic_default() {
    let analysis = classify("nothing of note in this text");
    assert_eq!(analysis.threat_score, 25);
    assert!(analysis.mitre_technique.starts_with("T1001"));
}

#[test]
fn classifier_priority_order_is_fixed() {
    // both rule 1 and rule 2 match; rule 1 wins
    let analysis = classify("login prompt dropped by trojan");
    assert_eq!(analysis.threat_score, 75);
}

#[test]
fn severity_bands_follow_the_score_boundaries() {
    assert_eq!(Severity::from_score(0), Severity::Low);
    assert_eq!(Severity::from_score(30), Severity::Low);
    assert_eq!(Severity::from_score(31), Severity::Medium);
    assert_eq!(Severity::from_score(60), Severity::Medium);
    assert_eq!(Severity::from_score(61), Severity::High);
    assert_eq!(Severity::from_score(100), Severity::High);
}
