use reqwest::StatusCode;

/// Cause of a single failed segment attempt.
#[derive(Debug, thiserror::Error, Clone)]
pub enum SegmentError {
    #[error("server returned status {0}")]
    Status(StatusCode),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SegmentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SegmentError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            SegmentError::Status(status)
        } else {
            SegmentError::Transport(err.to_string())
        }
    }
}

/// Invalid rendition choice. Recoverable: the interactive prompt asks again.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("choice {choice} is out of range 1..={count}")]
    OutOfRange { choice: i64, count: usize },
    #[error("playlist has no variants to choose from")]
    NoVariants,
    #[error("input closed before a choice was made")]
    InputClosed,
}
