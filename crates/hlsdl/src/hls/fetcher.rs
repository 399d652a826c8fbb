// HLS Segment Fetcher: Handles the raw download of individual media segments with retry logic.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::DownloadError;
use crate::hls::config::{HlsConfig, HlsFetcherConfig};
use crate::hls::error::SegmentError;

/// Upper bound on the buffer reserved from a `Content-Length` hint.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// Lifecycle of one segment download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    InFlight,
    RetryScheduled,
    Succeeded,
    Failed,
}

/// A segment waiting to be downloaded, owned by the acquisition engine.
#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub index: usize,
    pub url: Url,
    pub attempt_count: u32,
    pub last_error: Option<SegmentError>,
    pub state: JobState,
}

impl SegmentJob {
    pub fn new(index: usize, url: Url) -> Self {
        Self {
            index,
            url,
            attempt_count: 0,
            last_error: None,
            state: JobState::Pending,
        }
    }

    fn transition(&mut self, state: JobState) {
        trace!(index = self.index, from = ?self.state, to = ?state, "Segment job transition");
        self.state = state;
    }
}

/// Transport for a single segment request. Retries live in [`download_with_retries`].
#[async_trait]
pub trait SegmentDownloader: Send + Sync {
    async fn fetch_segment(&self, url: &Url) -> Result<Bytes, SegmentError>;
}

pub struct SegmentFetcher {
    http_client: Client,
    config: Arc<HlsConfig>,
}

impl SegmentFetcher {
    pub fn new(http_client: Client, config: Arc<HlsConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl SegmentDownloader for SegmentFetcher {
    /// Streams the response body into one buffer.
    /// Any non-2xx status, timeout or truncated body is an attempt failure.
    async fn fetch_segment(&self, url: &Url) -> Result<Bytes, SegmentError> {
        let response = self
            .http_client
            .get(url.clone())
            .timeout(self.config.fetcher_config.segment_download_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SegmentError::Status(status));
        }

        // The advertised length is untrusted; the buffer grows past the cap as chunks arrive.
        let capacity = response
            .content_length()
            .map_or(0, |n| n.min(MAX_PREALLOCATION) as usize);
        let mut buffer = BytesMut::with_capacity(capacity);
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        debug!("Downloaded {} bytes from segment URL: {}", buffer.len(), url);
        Ok(buffer.freeze())
    }
}

/// Runs a job to completion: up to `max_segment_attempts` attempts, sleeping
/// `attempt * segment_retry_delay_base` between them. Exhaustion is terminal.
pub async fn download_with_retries(
    downloader: &dyn SegmentDownloader,
    job: &mut SegmentJob,
    config: &HlsFetcherConfig,
) -> Result<Bytes, DownloadError> {
    let max_attempts = config.max_segment_attempts.max(1);

    loop {
        job.attempt_count += 1;
        job.transition(JobState::InFlight);

        match downloader.fetch_segment(&job.url).await {
            Ok(data) => {
                job.transition(JobState::Succeeded);
                return Ok(data);
            }
            Err(e) => {
                job.last_error = Some(e.clone());

                if job.attempt_count >= max_attempts {
                    job.transition(JobState::Failed);
                    error!(
                        index = job.index,
                        url = %job.url,
                        attempts = job.attempt_count,
                        error = %e,
                        "Segment download failed permanently"
                    );
                    return Err(DownloadError::SegmentDownload {
                        index: job.index,
                        url: job.url.to_string(),
                        attempts: job.attempt_count,
                        source: e,
                    });
                }

                warn!(
                    index = job.index,
                    url = %job.url,
                    attempt = job.attempt_count,
                    max_attempts,
                    error = %e,
                    "Segment download failed, retrying"
                );
                job.transition(JobState::RetryScheduled);
                tokio::time::sleep(config.segment_retry_delay_base * job.attempt_count).await;
            }
        }
    }
}
