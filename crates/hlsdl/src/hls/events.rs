use std::sync::Arc;

/// Progress notifications emitted by the segment writer.
///
/// Only the single writer task emits these, so `completed` is strictly
/// increasing and each segment is reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Acquisition is about to start.
    SegmentsDiscovered { total: usize },
    /// A segment's bytes were written and flushed to the sink, in list order.
    SegmentWritten {
        completed: usize,
        total: usize,
        bytes_written: u64,
    },
    /// Every segment was written and the sink flushed.
    Finished { total: usize, bytes_written: u64 },
}

/// A callback function for progress updates.
pub type OnProgress = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
