//! Muxing through an external `ffmpeg` binary.
//!
//! Streams are copied, never re-encoded. A subtitle file, when present, is
//! embedded as a `mov_text` caption stream. The intermediate files handed to
//! [`mux_and_cleanup`] are removed whatever the outcome of the process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::DownloadError;

const DEFAULT_MUXER: &str = "ffmpeg";
const STDERR_TAIL_LINES: usize = 5;

/// Handle to a located muxer binary.
#[derive(Debug, Clone)]
pub struct Muxer {
    binary: PathBuf,
}

impl Muxer {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Resolves the muxer binary, either the explicit path or `ffmpeg` on `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, DownloadError> {
        let wanted = explicit.map_or_else(|| PathBuf::from(DEFAULT_MUXER), Path::to_path_buf);
        let binary = which::which(&wanted).map_err(|e| {
            DownloadError::Mux(format!("cannot find muxer '{}': {e}", wanted.display()))
        })?;
        debug!(binary = %binary.display(), "Located muxer");
        Ok(Self::new(binary))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for one stream-copy invocation.
    pub fn build_args(video: &Path, subtitles: Option<&Path>, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(video.into());
        if let Some(subtitles) = subtitles {
            args.push("-i".into());
            args.push(subtitles.into());
        }
        args.push("-c".into());
        args.push("copy".into());
        if subtitles.is_some() {
            args.push("-c:s".into());
            args.push("mov_text".into());
        }
        args.push(output.into());
        args
    }

    /// Runs the muxer once and waits for it to exit.
    pub async fn mux(
        &self,
        video: &Path,
        subtitles: Option<&Path>,
        output: &Path,
    ) -> Result<(), DownloadError> {
        let args = Self::build_args(video, subtitles, output);
        info!(
            output = %output.display(),
            with_subtitles = subtitles.is_some(),
            "Muxing segments"
        );
        debug!(binary = %self.binary.display(), ?args, "Spawning muxer");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DownloadError::Mux(format!("failed to run {}: {e}", self.binary.display()))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(DownloadError::Mux(format!(
                "{} exited with {}: {tail}",
                self.binary.display(),
                result.status
            )));
        }
        Ok(())
    }
}

/// Intermediate files of a run, deleted once muxing is over.
#[derive(Debug)]
pub struct MuxInputs {
    pub segments: TempPath,
    pub subtitles: Option<TempPath>,
}

impl MuxInputs {
    fn cleanup(self) {
        let paths = std::iter::once(self.segments).chain(self.subtitles);
        for path in paths {
            let shown = path.display().to_string();
            match path.close() {
                Ok(()) => debug!(path = %shown, "Removed temporary file"),
                Err(e) => warn!(path = %shown, error = %e, "Failed to remove temporary file"),
            }
        }
    }
}

/// Muxes `inputs` into `output`, then removes the inputs unconditionally.
pub async fn mux_and_cleanup(
    muxer: &Muxer,
    inputs: MuxInputs,
    output: &Path,
) -> Result<(), DownloadError> {
    let result = muxer
        .mux(&inputs.segments, inputs.subtitles.as_deref(), output)
        .await;
    inputs.cleanup();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_subtitles() {
        let args = Muxer::build_args(Path::new("/tmp/a.ts"), None, Path::new("out.mp4"));
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-loglevel", "error", "-i", "/tmp/a.ts", "-c", "copy",
                "out.mp4"
            ]
        );
    }

    #[test]
    fn test_args_with_subtitles() {
        let args = Muxer::build_args(
            Path::new("/tmp/a.ts"),
            Some(Path::new("/tmp/a.srt")),
            Path::new("out.mp4"),
        );
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-loglevel", "error", "-i", "/tmp/a.ts", "-i", "/tmp/a.srt",
                "-c", "copy", "-c:s", "mov_text", "out.mp4"
            ]
        );
    }

    #[test]
    fn test_locate_missing_binary() {
        let err = Muxer::locate(Some(Path::new("definitely-not-a-muxer-xyz"))).unwrap_err();
        assert!(matches!(err, DownloadError::Mux(_)));
    }

    fn temp_inputs() -> (MuxInputs, PathBuf, PathBuf) {
        let segments = tempfile::Builder::new()
            .suffix(".ts")
            .tempfile()
            .unwrap()
            .into_temp_path();
        let subtitles = tempfile::Builder::new()
            .suffix(".srt")
            .tempfile()
            .unwrap()
            .into_temp_path();
        let (seg_path, sub_path) = (segments.to_path_buf(), subtitles.to_path_buf());
        (
            MuxInputs {
                segments,
                subtitles: Some(subtitles),
            },
            seg_path,
            sub_path,
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cleanup_after_success() {
        let muxer = Muxer::locate(Some(Path::new("true"))).unwrap();
        let (inputs, seg_path, sub_path) = temp_inputs();

        mux_and_cleanup(&muxer, inputs, Path::new("/dev/null"))
            .await
            .unwrap();

        assert!(!seg_path.exists());
        assert!(!sub_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cleanup_after_failure() {
        let muxer = Muxer::locate(Some(Path::new("false"))).unwrap();
        let (inputs, seg_path, sub_path) = temp_inputs();

        let err = mux_and_cleanup(&muxer, inputs, Path::new("/dev/null"))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Mux(_)));
        assert!(!seg_path.exists());
        assert!(!sub_path.exists());
    }
}
