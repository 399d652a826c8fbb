// HLS engine: playlist resolution, rendition selection and ordered segment acquisition.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod hls_downloader;
pub mod output;
pub mod parser;
pub mod playlist;
pub mod scheduler;
pub mod selector;

// Re-exports for easier access
pub use config::{HlsConfig, HlsConfigBuilder, VariantSelectionPolicy};
pub use coordinator::HlsStreamCoordinator;
pub use error::{SegmentError, SelectionError};
pub use events::{OnProgress, ProgressEvent};
pub use fetcher::{JobState, SegmentDownloader, SegmentFetcher, SegmentJob};
pub use hls_downloader::{DownloadOptions, DownloadReport, HlsDownloader};
pub use output::AcquisitionStats;
pub use parser::{MediaPlaylist, PlaylistDocument, SubtitleTrack, Variant};
pub use playlist::{InitialPlaylist, PlaylistEngine, PlaylistProvider};
pub use selector::{VariantChooser, select_variant, validate_choice};
