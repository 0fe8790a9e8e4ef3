//! A recorded calculation.

use serde::{Deserialize, Serialize};

/// A calculation recorded in the history.
///
/// Entries are write-once: the store hands out shared references only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    /// Unique identifier within the store.
    pub id: String,
    /// The expression (or word problem text) that was answered.
    pub expression: String,
    /// The result as displayed.
    pub result: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Calculation {
    pub(crate) fn new(id: u64, expression: String, result: String, timestamp: u64) -> Self {
        Self {
            id: id.to_string(),
            expression,
            result,
            timestamp,
        }
    }

    /// Numeric form of the id, if it was assigned by a [`HistoryStore`].
    ///
    /// [`HistoryStore`]: super::HistoryStore
    pub fn sequence(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// One-line summary used in listings.
    pub fn summary(&self) -> String {
        format!("{} = {}", self.expression, self.result)
    }
}
