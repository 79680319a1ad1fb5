pub mod blend;
pub use blend::history_suggestions;

pub mod history_service;
pub mod history_service_impl;
pub use history_service::{HistoryError, HistoryScope, HistoryStore, observe};
pub use history_service_impl::{MemoryHistoryStore, SeaOrmHistoryStore};

pub mod retention;
pub use retention::{RetentionOutcome, RetentionPolicy};

pub mod settings;
pub use settings::{Settings, SettingsError, SettingsStore};

pub mod navigation;
pub use navigation::{BrowserNavigator, NavigationError, Navigator, PrintNavigator};

pub mod session;
pub use session::{SearchSession, SessionError, SessionServices, SuggestionRow, SuggestionView};
