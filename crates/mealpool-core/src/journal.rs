use crate::types::PoolEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hash-chained journal entry for one emitted pool event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry_id: String,
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub event: PoolEvent,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Append-only record of every successful state transition.
///
/// No in-place mutation APIs are exposed; each transition becomes one more
/// entry, chained by blake3 hash so tampering with history is detectable.
/// Failed operations never reach the journal.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an event, linking it to the previous entry's hash.
    pub fn append(&mut self, event: PoolEvent) -> &JournalEntry {
        let index = self.entries.len() as u64;
        let timestamp = Utc::now();
        let previous_hash = self.entries.last().map(|entry| entry.entry_hash.clone());
        let entry_hash =
            compute_entry_hash(index, timestamp, &event, previous_hash.as_deref());

        self.entries.push(JournalEntry {
            entry_id: Uuid::new_v4().to_string(),
            index,
            timestamp,
            event,
            previous_hash,
            entry_hash,
        });
        // Just pushed, so last() is present.
        self.entries.last().unwrap()
    }

    /// Walk the chain and recompute every hash.
    pub fn verify_chain(&self) -> bool {
        let mut previous_hash: Option<String> = None;
        for (expected_index, entry) in self.entries.iter().enumerate() {
            if entry.index != expected_index as u64 {
                return false;
            }
            let expected_hash = compute_entry_hash(
                entry.index,
                entry.timestamp,
                &entry.event,
                previous_hash.as_deref(),
            );
            if entry.entry_hash != expected_hash || entry.previous_hash != previous_hash {
                return false;
            }
            previous_hash = Some(entry.entry_hash.clone());
        }
        true
    }
}

fn compute_entry_hash(
    index: u64,
    timestamp: DateTime<Utc>,
    event: &PoolEvent,
    previous_hash: Option<&str>,
) -> String {
    let material = serde_json::json!({
        "index": index,
        "timestamp": timestamp,
        "event": event,
        "previous_hash": previous_hash,
    });

    let bytes = serde_json::to_vec(&material).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}
