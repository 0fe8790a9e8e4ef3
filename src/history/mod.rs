//! Calculation history.

mod calculation;
mod store;

pub use calculation::Calculation;
pub use store::{HISTORY_CAPACITY, HistoryError, HistoryStore};
