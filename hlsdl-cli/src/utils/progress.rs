use hlsdl_engine::ProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use super::format_bytes;

fn segments_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} segments ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Renders segment progress as a terminal bar.
#[derive(Clone)]
pub struct ProgressManager {
    bar: Arc<Mutex<Option<ProgressBar>>>,
    disabled: bool,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            bar: Arc::new(Mutex::new(None)),
            disabled: false,
        }
    }

    pub fn new_disabled() -> Self {
        Self {
            bar: Arc::new(Mutex::new(None)),
            disabled: true,
        }
    }

    pub fn handle_event(&self, event: ProgressEvent) {
        if self.disabled {
            return;
        }
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };

        match event {
            ProgressEvent::SegmentsDiscovered { total } => {
                let new_bar = ProgressBar::new(total as u64);
                new_bar.set_style(segments_style());
                new_bar.set_message("Downloading segments");
                new_bar.enable_steady_tick(Duration::from_millis(200));
                *bar = Some(new_bar);
            }
            ProgressEvent::SegmentWritten {
                completed,
                bytes_written,
                ..
            } => {
                if let Some(bar) = bar.as_ref() {
                    bar.set_position(completed as u64);
                    bar.set_message(format!("Downloaded {}", format_bytes(bytes_written)));
                }
            }
            ProgressEvent::Finished {
                total,
                bytes_written,
            } => {
                if let Some(bar) = bar.take() {
                    bar.set_position(total as u64);
                    bar.finish_with_message(format!(
                        "Downloaded {total} segments, {}",
                        format_bytes(bytes_written)
                    ));
                }
            }
        }
    }

    /// Removes a bar left behind by an aborted run.
    pub fn abandon(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.abandon();
            }
        }
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_follows_events() {
        let manager = ProgressManager::new();
        manager.handle_event(ProgressEvent::SegmentsDiscovered { total: 3 });
        manager.handle_event(ProgressEvent::SegmentWritten {
            completed: 2,
            total: 3,
            bytes_written: 2048,
        });
        {
            let bar = manager.bar.lock().unwrap();
            let bar = bar.as_ref().unwrap();
            assert_eq!(bar.length(), Some(3));
            assert_eq!(bar.position(), 2);
        }

        manager.handle_event(ProgressEvent::Finished {
            total: 3,
            bytes_written: 4096,
        });
        assert!(manager.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_disabled_manager_ignores_events() {
        let manager = ProgressManager::new_disabled();
        assert!(manager.is_disabled());
        manager.handle_event(ProgressEvent::SegmentsDiscovered { total: 3 });
        assert!(manager.bar.lock().unwrap().is_none());
    }
}
