// HLS Output Manager: single writer of the assembled segment stream.
// Completions arrive in any order; bytes leave strictly by segment index.

use crate::DownloadError;
use crate::hls::config::HlsOutputConfig;
use crate::hls::events::{OnProgress, ProgressEvent};
use crate::hls::scheduler::FetchedSegment;
use std::collections::BTreeMap;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Totals of a completed acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub segments: usize,
    pub bytes_written: u64,
    /// Attempts beyond the first, summed over all segments.
    pub retries: u64,
}

pub struct OutputManager<W> {
    input_rx: mpsc::Receiver<Result<FetchedSegment, DownloadError>>,
    sink: BufWriter<W>,
    reorder_buffer: BTreeMap<usize, FetchedSegment>,
    next_index: usize,
    total: usize,
    bytes_written: u64,
    retries: u64,
    on_progress: Option<OnProgress>,
}

impl<W> OutputManager<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        config: &HlsOutputConfig,
        input_rx: mpsc::Receiver<Result<FetchedSegment, DownloadError>>,
        sink: W,
        total: usize,
        on_progress: Option<OnProgress>,
    ) -> Self {
        Self {
            input_rx,
            sink: BufWriter::with_capacity(config.write_buffer_capacity.max(1), sink),
            reorder_buffer: BTreeMap::new(),
            next_index: 0,
            total,
            bytes_written: 0,
            retries: 0,
            on_progress,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }

    /// Consumes completions until all `total` segments are written.
    ///
    /// The first error received ends the run; nothing is written after it.
    /// Returns the flushed sink so the caller can finalize it.
    pub async fn run(mut self) -> Result<(AcquisitionStats, W), DownloadError> {
        self.emit(ProgressEvent::SegmentsDiscovered { total: self.total });

        while self.next_index < self.total {
            match self.input_rx.recv().await {
                Some(Ok(segment)) => {
                    trace!(
                        index = segment.index,
                        expected = self.next_index,
                        "Adding segment to reorder buffer."
                    );
                    self.reorder_buffer.insert(segment.index, segment);
                    self.write_ready_segments().await?;
                }
                Some(Err(e)) => {
                    error!(
                        written = self.next_index,
                        buffered = self.reorder_buffer.len(),
                        "Acquisition aborted: {e}"
                    );
                    return Err(e);
                }
                None => {
                    error!(
                        written = self.next_index,
                        total = self.total,
                        "Segment channel closed before all segments arrived."
                    );
                    return Err(DownloadError::Cancelled);
                }
            }
        }

        self.sink.flush().await?;
        debug!(
            segments = self.total,
            bytes = self.bytes_written,
            "All segments written."
        );
        self.emit(ProgressEvent::Finished {
            total: self.total,
            bytes_written: self.bytes_written,
        });

        let stats = AcquisitionStats {
            segments: self.total,
            bytes_written: self.bytes_written,
            retries: self.retries,
        };
        Ok((stats, self.sink.into_inner()))
    }

    /// Writes every buffered segment that directly follows what is already written.
    async fn write_ready_segments(&mut self) -> Result<(), DownloadError> {
        while let Some(segment) = self.reorder_buffer.remove(&self.next_index) {
            self.sink.write_all(&segment.data).await?;
            // Reported bytes must have reached the underlying writer.
            self.sink.flush().await?;
            self.bytes_written += segment.data.len() as u64;
            self.retries += u64::from(segment.attempts.saturating_sub(1));
            self.next_index += 1;

            self.emit(ProgressEvent::SegmentWritten {
                completed: self.next_index,
                total: self.total,
                bytes_written: self.bytes_written,
            });
            // Releases the segment's window permit.
            drop(segment);
        }
        Ok(())
    }
}
