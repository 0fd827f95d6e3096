use thiserror::Error;

/// Errors that end an invocation. Raised before any page is fetched
/// (validation, setup) or while reading/writing a CSV file.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page count must be between 1 and {max}, got {got}")]
    InvalidPageCount { got: u32, max: u32 },

    #[error("unknown category '{name}' (expected one of: {expected})")]
    UnknownCategory { name: String, expected: String },

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single page could not be retrieved. Recorded in the run report;
/// never stops the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}
