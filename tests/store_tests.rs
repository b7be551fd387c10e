use std::path::PathBuf;

use threat_triage::core::store::{HistoryStore, HISTORY_CAP, LOG_INPUT_LIMIT};
use threat_triage::core::types::ThreatAnalysis;

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tt_store_{}.db", name));
    let _ = std::fs::remove_file(&path);
    path
}

fn analysis(score: u8, technique: &str) -> ThreatAnalysis {
    ThreatAnalysis {
        threat_score: score,
        cause: "cause".to_string(),
        remedy: "remedy".to_string(),
        mitre_technique: technique.to_string(),
        mitre_attck_url: None,
        approach: vec!["step".to_string()],
        mock: false,
    }
}

#[test]
fn list_after_save_reflects_the_save_first() {
    let mut store = HistoryStore::new(&temp_db("save_order")).unwrap();
    store.save(&analysis(10, "T1"), "first").unwrap();
    store.save(&analysis(20, "T2"), "second").unwrap();

    let entries = store.list();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].log_input, "second");
    assert_eq!(entries[1].log_input, "first");
}

#[test]
fn history_caps_at_one_hundred_entries() {
    let mut store = HistoryStore::new(&temp_db("cap")).unwrap();
    for i in 0..105 {
        store
            .save(&analysis(50, "T1"), &format!("log {}", i))
            .unwrap();
    }

    let entries = store.list();
    assert_eq!(entries.len(), HISTORY_CAP);
    assert_eq!(entries[0].log_input, "log 104");
    assert_eq!(entries[99].log_input, "log 5");
    assert!(!entries.iter().any(|e| e.log_input == "log 4"));
}

#[test]
fn ids_are_monotonically_increasing() {
    let mut store = HistoryStore::new(&temp_db("ids")).unwrap();
    for i in 0..10 {
        store.save(&analysis(50, "T1"), &format!("log {}", i)).unwrap();
    }
    let entries = store.list();
    for pair in entries.windows(2) {
        let newer: i64 = pair[0].id.parse().unwrap();
        let older: i64 = pair[1].id.parse().unwrap();
        assert!(newer > older);
    }
}

#[test]
fn log_input_is_truncated_before_storage() {
    let mut store = HistoryStore::new(&temp_db("truncate")).unwrap();
    let long_input = "a".repeat(LOG_INPUT_LIMIT + 100);
    let entry = store.save(&analysis(50, "T1"), &long_input).unwrap();
    assert_eq!(entry.log_input.chars().count(), LOG_INPUT_LIMIT);
}

#[test]
fn save_forces_the_mock_flag_off() {
    let mut store = HistoryStore::new(&temp_db("mock_flag")).unwrap();
    let mut mocked = analysis(50, "T1");
    mocked.mock = true;
    let entry = store.save(&mocked, "log").unwrap();
    assert!(!entry.analysis.mock);
    assert!(!store.list()[0].analysis.mock);
}

#[test]
fn delete_removes_the_matching_entry() {
    let mut store = HistoryStore::new(&temp_db("delete")).unwrap();
    let first = store.save(&analysis(10, "T1"), "first").unwrap();
    store.save(&analysis(20, "T2"), "second").unwrap();

    assert!(store.delete(&first.id));
    let entries = store.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_input, "second");
}

#[test]
fn deleting_a_nonexistent_id_is_a_noop_success() {
    let mut store = HistoryStore::new(&temp_db("delete_missing")).unwrap();
    store.save(&analysis(10, "T1"), "only").unwrap();

    assert!(store.delete("does-not-exist"));
    let entries = store.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_input, "only");
}

#[test]
fn clear_empties_the_history() {
    let mut store = HistoryStore::new(&temp_db("clear")).unwrap();
    store.save(&analysis(10, "T1"), "one").unwrap();
    store.save(&analysis(20, "T2"), "two").unwrap();

    assert!(store.clear());
    assert!(store.list().is_empty());
    // clearing an already-empty history is still a success
    assert!(store.clear());
}

#[test]
fn corrupt_slot_document_reads_as_empty() {
    let path = temp_db("corrupt");
    let mut store = HistoryStore::new(&path).unwrap();
    store.save(&analysis(10, "T1"), "entry").unwrap();

    // scribble over the slot from a second connection
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE slots SET value = ?1",
        rusqlite::params!["{ not json"],
    )
    .unwrap();

    assert!(store.list().is_empty());
}

#[test]
fn slot_keys_isolate_histories_within_one_database() {
    let path = temp_db("slot_keys");
    let mut primary = HistoryStore::new(&path).unwrap();
    let mut other = HistoryStore::with_slot_key(&path, "secondary_history").unwrap();

    primary.save(&analysis(10, "T1"), "primary entry").unwrap();
    other.save(&analysis(20, "T2"), "other entry").unwrap();

    assert_eq!(primary.list().len(), 1);
    assert_eq!(other.list().len(), 1);
    assert_eq!(primary.list()[0].log_input, "primary entry");
    assert_eq!(other.list()[0].log_input, "other entry");
}

#[test]
fn stored_documents_keep_the_original_wire_shape() {
    let path = temp_db("wire_shape");
    let mut store = HistoryStore::new(&path).unwrap();
    store.save(&analysis(42, "T1"), "some log").unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let doc: String = conn
        .query_row("SELECT value FROM slots", [], |row| row.get(0))
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();

    let entry = &parsed.as_array().unwrap()[0];
    assert!(entry.get("logInput").is_some());
    assert!(entry.get("id").is_some());
    assert!(entry.get("timestamp").is_some());
    assert_eq!(entry["analysis"]["threat_score"], 42);
}
