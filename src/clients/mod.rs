pub mod suggest;

pub use suggest::{SuggestionClient, SuggestionSource};
