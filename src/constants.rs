pub const APP_NAME: &str = "bettersearch";

/// Namespace prefix hashed into every engine identifier.
pub const ENGINE_ID_NAMESPACE: &str = "ch.frauenfelderflorian.bettersearch:searchengine";

pub mod history {

    pub const MAX_ENTRIES: u64 = 10_000;

    pub const EVICTION_BATCH: u64 = 10;

    pub const RECENT_LIMIT: usize = 5;

    pub const FUZZY_MAX_DISTANCE: usize = 2;
}

pub mod intervals {
    use std::time::Duration;

    pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(100);
}

pub mod http {

    pub const FIREFOX_ANDROID_USER_AGENT: &str =
        "Mozilla/5.0 (Android 15; Mobile; rv:139.0) Gecko/139.0 Firefox/139.0";

    pub const ERROR_PREFIX: &str = "Error: ";
}
