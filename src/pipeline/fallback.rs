use crate::core::types::ThreatAnalysis;

/// Deterministic keyword classifier used when the workflow returns an
/// unprocessed webhook envelope, or standalone in offline mode. Matching is
/// case-insensitive and priority-ordered; the first matching rule wins. All
/// results are marked mock and are never persisted.
pub fn classify(log_text: &str) -> ThreatAnalysis {
    let log = log_text.to_lowercase();

    if contains_any(&log, &["failed", "login", "auth"]) {
        return ThreatAnalysis {
            threat_score: 75,
            cause: "Multiple failed authentication attempts detected - potential brute force attack"
                .to_string(),
            remedy: "Implement account lockout policies and monitor for suspicious IP addresses"
                .to_string(),
            mitre_technique: "T1110.001 - Password Spraying".to_string(),
            mitre_attck_url: Some("https://attack.mitre.org/techniques/T1110/001/".to_string()),
            approach: vec![
                "Enable account lockout after failed attempts".to_string(),
                "Implement multi-factor authentication".to_string(),
                "Monitor and block suspicious IP addresses".to_string(),
                "Review password policies".to_string(),
            ],
            mock: true,
        };
    }

    if contains_any(&log, &["malware", "virus", "trojan"]) {
        return ThreatAnalysis {
            threat_score: 95,
            cause: "Malware detected on system - immediate containment required".to_string(),
            remedy: "Isolate affected system and run full antimalware scan".to_string(),
            mitre_technique: "T1204.002 - Malicious File".to_string(),
            mitre_attck_url: Some("https://attack.mitre.org/techniques/T1204/002/".to_string()),
            approach: vec![
                "Immediately isolate infected system".to_string(),
                "Run comprehensive malware scan".to_string(),
                "Check for lateral movement".to_string(),
                "Update antimalware signatures".to_string(),
            ],
            mock: true,
        };
    }

    if contains_any(&log, &["unauthorized", "access", "privilege"]) {
        return ThreatAnalysis {
            threat_score: 65,
            cause: "Unauthorized access attempt or privilege escalation detected".to_string(),
            remedy: "Review access controls and user permissions".to_string(),
            mitre_technique: "T1078 - Valid Accounts".to_string(),
            mitre_attck_url: Some("https://attack.mitre.org/techniques/T1078/".to_string()),
            approach: vec![
                "Audit user permissions and access logs".to_string(),
                "Implement principle of least privilege".to_string(),
                "Review and update access controls".to_string(),
                "Monitor for suspicious account activity".to_string(),
            ],
            mock: true,
        };
    }

    if contains_any(&log, &["network", "connection", "traffic"]) {
        return ThreatAnalysis {
            threat_score: 45,
            cause: "Suspicious network activity detected".to_string(),
            remedy: "Monitor network traffic and check for anomalies".to_string(),
            mitre_technique: "T1071 - Application Layer Protocol".to_string(),
            mitre_attck_url: Some("https://attack.mitre.org/techniques/T1071/".to_string()),
            approach: vec![
                "Monitor network traffic patterns".to_string(),
                "Implement network segmentation".to_string(),
                "Review firewall rules".to_string(),
                "Check for data exfiltration".to_string(),
            ],
            mock: true,
        };
    }

    ThreatAnalysis {
        threat_score: 25,
        cause: "General security event detected".to_string(),
        remedy: "Monitor and investigate further".to_string(),
        mitre_technique: "T1001 - Data Obfuscation".to_string(),
        mitre_attck_url: Some("https://attack.mitre.org/techniques/T1001/".to_string()),
        approach: vec![
            "Review security logs".to_string(),
            "Implement monitoring".to_string(),
            "Update security policies".to_string(),
        ],
        mock: true,
    }
}

fn contains_any(log: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| log.contains(needle))
}
