//! Capacity-bounded calculation history, newest first.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::debug;

use super::calculation::Calculation;

/// Maximum number of calculations kept.
pub const HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file error: {0}")]
    Io(#[from] io::Error),

    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ordered history of calculations.
///
/// New entries go to the front; once the store holds `capacity` entries the
/// oldest one is evicted. Entries are never updated or removed otherwise.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    entries: VecDeque<Calculation>,
    capacity: usize,
    last_id: u64,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            last_id: 0,
        }
    }

    /// Record a calculation and return the stored entry.
    pub fn append(
        &mut self,
        expression: impl Into<String>,
        result: impl Into<String>,
    ) -> &Calculation {
        let timestamp = now_millis();
        // Ids follow the clock but never repeat, even within one millisecond.
        let id = timestamp.max(self.last_id + 1);
        self.last_id = id;

        let calculation = Calculation::new(id, expression.into(), result.into(), timestamp);
        debug!(id = %calculation.id, "Recorded calculation");

        self.entries.push_front(calculation);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// All entries, newest first.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &Calculation> {
        self.entries.iter()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&Calculation> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// The entry at `index`, where 0 is the newest.
    pub fn nth(&self, index: usize) -> Option<&Calculation> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&Calculation> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write the history to `path` as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries: Vec<&Calculation> = self.entries.iter().collect();
        let contents = serde_json::to_string_pretty(&entries)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Restore a history written by [`save`](Self::save).
    ///
    /// A missing file yields an empty store. Entries past `capacity` are
    /// dropped, and new ids continue after the largest restored one.
    pub fn load(path: &Path, capacity: usize) -> Result<Self, HistoryError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::with_capacity(capacity));
            }
            Err(e) => return Err(e.into()),
        };

        let capacity = capacity.max(1);
        let mut entries: VecDeque<Calculation> = serde_json::from_str(&contents)?;
        entries.truncate(capacity);

        let last_id = entries
            .iter()
            .filter_map(Calculation::sequence)
            .max()
            .unwrap_or(0);

        debug!(count = entries.len(), path = %path.display(), "Loaded history");

        Ok(Self {
            entries,
            capacity,
            last_id,
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
