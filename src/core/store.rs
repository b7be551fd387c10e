use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::TriageError;
use crate::core::time::now_utc;
use crate::core::types::{
    HistoryEntry, SortKey, SortOrder, Statistics, TechniqueCount, ThreatAnalysis,
};

/// Slot key kept identical to the browser build so exported history
/// documents stay interchangeable.
pub const HISTORY_SLOT_KEY: &str = "security_threat_history";

/// Only the 100 most recent entries are retained.
pub const HISTORY_CAP: usize = 100;

/// Submitted log text is truncated before storage.
pub const LOG_INPUT_LIMIT: usize = 500;

/// Persistent, append-only (with delete) log of past analyses. The whole
/// history lives as one serialized JSON document under a single key, mirroring
/// the original local-storage slot. Write failures are swallowed and reported
/// as boolean/None outcomes; they never raise to the caller.
pub struct HistoryStore {
    conn: Connection,
    slot_key: String,
}

impl HistoryStore {
    pub fn new(path: &Path) -> Result<Self, TriageError> {
        Self::with_slot_key(path, HISTORY_SLOT_KEY)
    }

    pub fn with_slot_key(path: &Path, slot_key: &str) -> Result<Self, TriageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            slot_key: slot_key.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), TriageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS slots (
               key TEXT PRIMARY KEY,
               value TEXT NOT NULL
             );",
        )?;
        Ok(())
    }

    /// Prepend a new entry and persist the capped history. Returns the stored
    /// entry, or None when persistence failed.
    pub fn save(&mut self, analysis: &ThreatAnalysis, log_input: &str) -> Option<HistoryEntry> {
        let mut entries = self.list();

        let now = now_utc();
        let mut id = now.timestamp_millis();
        // keep ids monotonic when two saves land in the same millisecond
        if let Some(head) = entries.first() {
            if let Ok(prev) = head.id.parse::<i64>() {
                if id <= prev {
                    id = prev + 1;
                }
            }
        }

        let entry = HistoryEntry {
            id: id.to_string(),
            timestamp: now,
            log_input: log_input.chars().take(LOG_INPUT_LIMIT).collect(),
            analysis: ThreatAnalysis {
                mock: false,
                ..analysis.clone()
            },
        };

        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_CAP);

        match self.write_slot(&entries) {
            Ok(()) => Some(entry),
            Err(err) => {
                tracing::warn!("failed to persist history entry: {}", err);
                None
            }
        }
    }

    /// All entries, newest first. A missing or corrupt document reads as an
    /// empty history rather than an error.
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.read_slot() {
            Ok(Some(doc)) => serde_json::from_str(&doc).unwrap_or_else(|err| {
                tracing::warn!("stored history is corrupt, treating as empty: {}", err);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!("failed to load history: {}", err);
                Vec::new()
            }
        }
    }

    /// Remove the entry with the given id. Returns whether the persistence
    /// write succeeded; deleting an id that is not present is a no-op success.
    pub fn delete(&mut self, id: &str) -> bool {
        let mut entries = self.list();
        entries.retain(|entry| entry.id != id);
        match self.write_slot(&entries) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to delete history entry {}: {}", id, err);
                false
            }
        }
    }

    /// Drop the whole history. Returns whether the clear succeeded.
    pub fn clear(&mut self) -> bool {
        match self
            .conn
            .execute("DELETE FROM slots WHERE key = ?1", params![self.slot_key])
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("failed to clear history: {}", err);
                false
            }
        }
    }

    fn read_slot(&self) -> Result<Option<String>, TriageError> {
        let doc = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![self.slot_key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(doc)
    }

    fn write_slot(&mut self, entries: &[HistoryEntry]) -> Result<(), TriageError> {
        let doc = serde_json::to_string(entries)
            .map_err(|err| TriageError::PersistenceUnavailable(err.to_string()))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (key, value) VALUES (?1, ?2)",
            params![self.slot_key, doc],
        )?;
        Ok(())
    }
}

/// Stable sort over a snapshot of entries; the store's own order is untouched.
pub fn sort_history(entries: &[HistoryEntry], key: SortKey, order: SortOrder) -> Vec<HistoryEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match key {
            SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortKey::ThreatScore => a.analysis.threat_score.cmp(&b.analysis.threat_score),
            SortKey::Technique => a.analysis.mitre_technique.cmp(&b.analysis.mitre_technique),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    sorted
}

/// Keep entries whose score falls in [min_score, max_score], both inclusive,
/// preserving relative order.
pub fn filter_history(entries: &[HistoryEntry], min_score: u8, max_score: u8) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| {
            let score = entry.analysis.threat_score;
            score >= min_score && score <= max_score
        })
        .cloned()
        .collect()
}

pub fn history_statistics(entries: &[HistoryEntry]) -> Statistics {
    if entries.is_empty() {
        return Statistics::default();
    }

    let sum: u64 = entries
        .iter()
        .map(|entry| entry.analysis.threat_score as u64)
        .sum();
    let average_score = (sum as f64 / entries.len() as f64).round() as u32;

    let high_threats = entries
        .iter()
        .filter(|entry| entry.analysis.threat_score > 60)
        .count();
    let medium_threats = entries
        .iter()
        .filter(|entry| {
            let score = entry.analysis.threat_score;
            score > 30 && score <= 60
        })
        .count();
    let low_threats = entries
        .iter()
        .filter(|entry| entry.analysis.threat_score <= 30)
        .count();

    // encounter-order counting so ties keep a stable, first-seen order
    let mut counts: Vec<TechniqueCount> = Vec::new();
    for entry in entries {
        let technique = &entry.analysis.mitre_technique;
        if technique.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|tc| &tc.technique == technique) {
            Some(tc) => tc.count += 1,
            None => counts.push(TechniqueCount {
                technique: technique.clone(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(5);

    Statistics {
        total: entries.len(),
        average_score,
        high_threats,
        medium_threats,
        low_threats,
        top_techniques: counts,
    }
}
