// HLS Segment Scheduler: runs segment downloads on a bounded pool of in-flight futures.

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::fetcher::{SegmentDownloader, SegmentJob, download_with_retries};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Downloaded bytes of one segment on their way to the writer.
///
/// Carries the window permit taken at dispatch; the permit is released when the
/// writer drops the segment after writing it.
#[derive(Debug)]
pub struct FetchedSegment {
    pub index: usize,
    pub data: Bytes,
    pub attempts: u32,
    _permit: OwnedSemaphorePermit,
}

pub struct SegmentScheduler {
    config: Arc<HlsConfig>,
    segment_fetcher: Arc<dyn SegmentDownloader>,
    window: Arc<Semaphore>,
    output_tx: mpsc::Sender<Result<FetchedSegment, DownloadError>>,
    cancel: CancellationToken,
}

impl SegmentScheduler {
    pub fn new(
        config: Arc<HlsConfig>,
        segment_fetcher: Arc<dyn SegmentDownloader>,
        window: Arc<Semaphore>,
        output_tx: mpsc::Sender<Result<FetchedSegment, DownloadError>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            segment_fetcher,
            window,
            output_tx,
            cancel,
        }
    }

    async fn perform_segment_download(
        segment_fetcher: Arc<dyn SegmentDownloader>,
        config: Arc<HlsConfig>,
        mut job: SegmentJob,
        permit: OwnedSemaphorePermit,
    ) -> Result<FetchedSegment, DownloadError> {
        let data =
            download_with_retries(segment_fetcher.as_ref(), &mut job, &config.fetcher_config)
                .await?;
        debug!(index = job.index, attempts = job.attempt_count, "Segment download successful");
        Ok(FetchedSegment {
            index: job.index,
            data,
            attempts: job.attempt_count,
            _permit: permit,
        })
    }

    /// Dispatches `jobs` in order and forwards every completion to the writer.
    ///
    /// Stops at the first terminal failure; dropping the remaining futures
    /// aborts their in-flight requests.
    pub async fn run(self, jobs: Vec<SegmentJob>) {
        let concurrency = self.config.scheduler_config.download_concurrency.max(1);
        info!(segments = jobs.len(), concurrency, "SegmentScheduler started.");

        let mut pending = jobs.into_iter().peekable();
        let mut futures: FuturesUnordered<BoxFuture<'static, Result<FetchedSegment, DownloadError>>> =
            FuturesUnordered::new();

        loop {
            let has_pending = pending.peek().is_some();
            let can_dispatch = has_pending && futures.len() < concurrency;
            let has_work = has_pending || !futures.is_empty();

            tokio::select! {
                biased;

                _ = self.cancel.cancelled(), if has_work => {
                    debug!(in_flight = futures.len(), "SegmentScheduler cancelled.");
                    break;
                }

                Some(result) = futures.next(), if !futures.is_empty() => {
                    let failed = result.is_err();
                    if self.output_tx.send(result).await.is_err() {
                        debug!("Output channel closed. Shutting down scheduler.");
                        break;
                    }
                    if failed {
                        warn!(in_flight = futures.len(), "Segment failed, aborting remaining downloads.");
                        break;
                    }
                }

                permit = Arc::clone(&self.window).acquire_owned(), if can_dispatch => {
                    let Ok(permit) = permit else {
                        warn!("Download window closed. Shutting down scheduler.");
                        break;
                    };
                    if let Some(job) = pending.next() {
                        futures.push(
                            Self::perform_segment_download(
                                Arc::clone(&self.segment_fetcher),
                                Arc::clone(&self.config),
                                job,
                                permit,
                            )
                            .boxed(),
                        );
                    }
                }

                else => {
                    break;
                }
            }
        }
        info!("SegmentScheduler finished.");
    }
}
