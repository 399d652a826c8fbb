use crate::hls::{SegmentError, SelectionError};

/// Error type for a whole download run.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch playlist {url}: {reason}")]
    PlaylistFetch { url: String, reason: String },

    #[error("Playlist parse error: {0}")]
    Parse(String),

    #[error("Segment {index} ({url}) failed after {attempts} attempts: {source}")]
    SegmentDownload {
        index: usize,
        url: String,
        attempts: u32,
        #[source]
        source: SegmentError,
    },

    #[error("Rendition selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Mux error: {0}")]
    Mux(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DownloadError {
    pub(crate) fn playlist_fetch(url: impl ToString, reason: impl ToString) -> Self {
        DownloadError::PlaylistFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
