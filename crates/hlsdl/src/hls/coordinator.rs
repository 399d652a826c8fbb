// HLS Stream Coordinator: wires the scheduler and the output writer for one acquisition.

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::events::OnProgress;
use crate::hls::fetcher::{SegmentDownloader, SegmentJob};
use crate::hls::output::{AcquisitionStats, OutputManager};
use crate::hls::scheduler::{FetchedSegment, SegmentScheduler};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

/// HLS Stream Coordinator: Sets up and runs the segment acquisition pipeline.
pub struct HlsStreamCoordinator;

impl HlsStreamCoordinator {
    /// Downloads `segments` concurrently and writes them to `sink` in list order.
    ///
    /// At most `download_concurrency` segments are in flight or waiting in the
    /// reorder buffer at any time. The first segment to exhaust its retries
    /// cancels the rest and is returned as the error; the sink must then be
    /// treated as garbage.
    pub async fn acquire<W>(
        segments: &[Url],
        config: Arc<HlsConfig>,
        segment_fetcher: Arc<dyn SegmentDownloader>,
        sink: W,
        on_progress: Option<OnProgress>,
    ) -> Result<(AcquisitionStats, W), DownloadError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if segments.is_empty() {
            return Err(DownloadError::Parse("no segments to download".to_string()));
        }

        let concurrency = config.scheduler_config.download_concurrency.max(1);
        let window = Arc::new(Semaphore::new(concurrency));
        // Every queued success holds a window permit, so sends never block on a full channel.
        let (segment_tx, segment_rx) =
            mpsc::channel::<Result<FetchedSegment, DownloadError>>(concurrency + 1);

        let cancel = CancellationToken::new();
        let _cancel_on_exit = cancel.clone().drop_guard();

        let jobs = segments
            .iter()
            .enumerate()
            .map(|(index, url)| SegmentJob::new(index, url.clone()))
            .collect();

        let scheduler = SegmentScheduler::new(
            Arc::clone(&config),
            segment_fetcher,
            window,
            segment_tx,
            cancel.clone(),
        );
        let scheduler_handle = tokio::spawn(scheduler.run(jobs));

        info!(segments = segments.len(), concurrency, "Starting segment acquisition");
        let output_manager = OutputManager::new(
            &config.output_config,
            segment_rx,
            sink,
            segments.len(),
            on_progress,
        );
        let result = output_manager.run().await;

        // Writer is done either way; stop whatever is still running.
        cancel.cancel();
        if let Err(e) = scheduler_handle.await {
            error!("Scheduler task ended abnormally: {e}");
        }

        match &result {
            Ok((stats, _)) => debug!(
                segments = stats.segments,
                bytes = stats.bytes_written,
                retries = stats.retries,
                "Segment acquisition complete"
            ),
            Err(e) => error!("Segment acquisition failed: {e}"),
        }
        result
    }
}
