//! Hand-off of a finished search to whatever displays the results.

use thiserror::Error;
use tracing::info;
use url::Url;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Invalid result URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to open browser: {0}")]
    Open(String),
}

/// Opens a results page.
pub trait Navigator: Send + Sync {
    fn open(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Opens URLs in the system's default browser without waiting for it.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn open(&self, url: &Url) -> Result<(), NavigationError> {
        info!(%url, "Opening results in browser");
        open::that_detached(url.as_str()).map_err(|e| NavigationError::Open(e.to_string()))
    }
}

/// Prints URLs to stdout instead of opening them.
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn open(&self, url: &Url) -> Result<(), NavigationError> {
        println!("{url}");
        Ok(())
    }
}
