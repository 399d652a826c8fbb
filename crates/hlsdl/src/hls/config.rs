use std::time::Duration;

use crate::DownloaderConfig;

/// Resolution preferred by automatic rendition selection.
pub const DEFAULT_TARGET_RESOLUTION: &str = "1280x720";

// --- Top-Level Configuration ---
#[derive(Debug, Clone, Default)]
pub struct HlsConfig {
    /// Base downloader configuration
    pub base: DownloaderConfig,
    pub playlist_config: HlsPlaylistConfig,
    pub scheduler_config: HlsSchedulerConfig,
    pub fetcher_config: HlsFetcherConfig,
    pub output_config: HlsOutputConfig,
}

impl HlsConfig {
    pub fn builder() -> HlsConfigBuilder {
        HlsConfigBuilder::new()
    }
}

// --- Playlist Configuration ---
#[derive(Debug, Clone)]
pub struct HlsPlaylistConfig {
    pub playlist_fetch_timeout: Duration,
    pub variant_selection_policy: VariantSelectionPolicy,
}

impl Default for HlsPlaylistConfig {
    fn default() -> Self {
        Self {
            playlist_fetch_timeout: Duration::from_secs(15),
            variant_selection_policy: Default::default(),
        }
    }
}

/// How a rendition is picked from a master playlist without asking the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSelectionPolicy {
    /// Exact string match on the `RESOLUTION` attribute (e.g. `1280x720`),
    /// falling back to the first variant in document order.
    TargetResolution(String),
    /// Always the first variant in document order.
    First,
    /// Zero-based position in document order.
    Index(usize),
}

impl Default for VariantSelectionPolicy {
    fn default() -> Self {
        VariantSelectionPolicy::TargetResolution(DEFAULT_TARGET_RESOLUTION.to_string())
    }
}

// --- Scheduler Configuration ---
#[derive(Debug, Clone)]
pub struct HlsSchedulerConfig {
    pub download_concurrency: usize, // Max concurrent segment downloads
}

impl Default for HlsSchedulerConfig {
    fn default() -> Self {
        Self {
            download_concurrency: 8,
        }
    }
}

// --- Fetcher Configuration ---
#[derive(Debug, Clone)]
pub struct HlsFetcherConfig {
    pub segment_download_timeout: Duration,
    /// Attempt ceiling per segment, first attempt included.
    pub max_segment_attempts: u32,
    /// Backoff after attempt `n` is `n * segment_retry_delay_base`.
    pub segment_retry_delay_base: Duration,
}

impl Default for HlsFetcherConfig {
    fn default() -> Self {
        Self {
            segment_download_timeout: Duration::from_secs(10),
            max_segment_attempts: 3,
            segment_retry_delay_base: Duration::from_secs(1),
        }
    }
}

// --- Output Configuration ---
#[derive(Debug, Clone)]
pub struct HlsOutputConfig {
    pub write_buffer_capacity: usize,
}

impl Default for HlsOutputConfig {
    fn default() -> Self {
        Self {
            write_buffer_capacity: 256 * 1024,
        }
    }
}

/// Fluent builder over [`HlsConfig`].
#[derive(Debug, Clone, Default)]
pub struct HlsConfigBuilder {
    config: HlsConfig,
}

impl HlsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_config(mut self, base_config: DownloaderConfig) -> Self {
        self.config.base = base_config;
        self
    }

    pub fn playlist_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.playlist_config.playlist_fetch_timeout = timeout;
        self
    }

    pub fn variant_selection_policy(mut self, policy: VariantSelectionPolicy) -> Self {
        self.config.playlist_config.variant_selection_policy = policy;
        self
    }

    /// Set the number of concurrent segment downloads. Zero is clamped to one.
    pub fn download_concurrency(mut self, concurrency: usize) -> Self {
        self.config.scheduler_config.download_concurrency = concurrency.max(1);
        self
    }

    pub fn segment_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetcher_config.segment_download_timeout = timeout;
        self
    }

    /// Set the attempt ceiling per segment. Zero is clamped to one.
    pub fn segment_attempts(mut self, attempts: u32) -> Self {
        self.config.fetcher_config.max_segment_attempts = attempts.max(1);
        self
    }

    pub fn segment_retry_delay(mut self, delay: Duration) -> Self {
        self.config.fetcher_config.segment_retry_delay_base = delay;
        self
    }

    pub fn write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.output_config.write_buffer_capacity = capacity;
        self
    }

    pub fn build(self) -> HlsConfig {
        self.config
    }
}
