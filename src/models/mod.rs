pub mod engine;
pub mod history;

pub use engine::{EngineCatalog, SearchEngine};
pub use history::HistoryEntry;
