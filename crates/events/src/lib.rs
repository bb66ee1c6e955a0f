//! Domain events emitted by billing aggregates, and the history entries
//! they are kept as.

pub mod event;
pub mod history;

pub use event::Event;
pub use history::HistoryEntry;
