use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download error: {0}")]
    Download(#[from] hlsdl_engine::DownloadError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),
}

impl From<hlsdl_engine::hls::SelectionError> for AppError {
    fn from(error: hlsdl_engine::hls::SelectionError) -> Self {
        AppError::Download(error.into())
    }
}
