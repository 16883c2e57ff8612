use thiserror::Error;

/// Result type for every fallible operation in the crate
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the scrape/normalize/sync pipeline.
///
/// Configuration and parse errors abort the run before any delivery happens;
/// transport errors abort mid-run and leave the dedup state at the last
/// successfully delivered seminar, so a re-run resumes where it stopped.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    PageStructure(String),

    #[error("Unexpected date format: {text}")]
    InvalidDate { text: String },

    #[error("Unexpected time range format: {text}")]
    InvalidTimeRange { text: String },

    #[error("Seminar '{title}' ends at or before its start")]
    EndNotAfterStart { title: String },

    #[error("Local time {text} does not exist in {zone}")]
    NonexistentLocalTime { text: String, zone: String },

    #[error("Failed to compose email message: {0}")]
    Compose(String),

    #[error("Mail delivery failed: {0}")]
    Transport(String),

    #[error("Calendar API request failed with {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
