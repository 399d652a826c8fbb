use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::mux::{MuxInputs, Muxer, mux_and_cleanup};
use crate::subtitle::vtt_to_srt;
use crate::{DownloadError, create_client};

use super::error::SelectionError;
use super::fetcher::{SegmentDownloader, SegmentFetcher};
use super::output::AcquisitionStats;
use super::parser::{MediaPlaylist, SubtitleTrack, parse_segments};
use super::playlist::{InitialPlaylist, PlaylistEngine, PlaylistProvider};
use super::selector::VariantChooser;
use super::{HlsConfig, HlsStreamCoordinator, OnProgress};

const TEMP_PREFIX: &str = "hlsdl-";
const PLAYLIST_MARKER: &str = "#EXTM3U";

/// Per-run options of [`HlsDownloader::download`].
#[derive(Clone)]
pub struct DownloadOptions {
    pub output: PathBuf,
    pub include_subtitles: bool,
    pub on_progress: Option<OnProgress>,
}

impl DownloadOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            include_subtitles: true,
            on_progress: None,
        }
    }

    pub fn with_subtitles(mut self, include: bool) -> Self {
        self.include_subtitles = include;
        self
    }

    pub fn with_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub output: PathBuf,
    pub segments: usize,
    pub bytes_written: u64,
    pub retries: u64,
    pub subtitles: bool,
    pub elapsed: Duration,
}

pub struct HlsDownloader {
    client: Client,
    config: Arc<HlsConfig>,
    playlist_engine: PlaylistEngine,
    segment_fetcher: Arc<dyn SegmentDownloader>,
}

impl HlsDownloader {
    pub fn new(config: HlsConfig) -> Result<Self, DownloadError> {
        let client = create_client(&config.base)?;
        let config = Arc::new(config);
        let playlist_engine = PlaylistEngine::new(client.clone(), Arc::clone(&config));
        let segment_fetcher: Arc<dyn SegmentDownloader> =
            Arc::new(SegmentFetcher::new(client.clone(), Arc::clone(&config)));
        Ok(Self {
            client,
            config,
            playlist_engine,
            segment_fetcher,
        })
    }

    pub fn config(&self) -> &HlsConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches and classifies the playlist the user pointed at.
    pub async fn load_playlist(&self, url: &str) -> Result<InitialPlaylist, DownloadError> {
        self.playlist_engine.load_initial_playlist(url).await
    }

    /// Turns the initial playlist into the media playlist to download,
    /// asking `chooser` to pick a rendition when it is a master playlist.
    pub async fn resolve_media_playlist(
        &self,
        initial: InitialPlaylist,
        chooser: &mut dyn VariantChooser,
    ) -> Result<MediaPlaylist, DownloadError> {
        match initial {
            InitialPlaylist::Media(media) => Ok(media),
            InitialPlaylist::Master { variants, .. } => {
                let index = chooser.choose(&variants)?;
                let variant = variants.get(index).ok_or(SelectionError::OutOfRange {
                    choice: index as i64 + 1,
                    count: variants.len(),
                })?;
                info!(
                    resolution = variant.resolution_label(),
                    url = %variant.playlist_url,
                    "Using variant {} of {}",
                    index + 1,
                    variants.len()
                );
                self.playlist_engine
                    .load_media_playlist(&variant.playlist_url)
                    .await
            }
        }
    }

    /// Downloads every segment of `media` into a fresh temporary `.ts` file.
    ///
    /// The file is deleted if acquisition fails.
    pub async fn acquire_segments(
        &self,
        media: &MediaPlaylist,
        on_progress: Option<OnProgress>,
    ) -> Result<(AcquisitionStats, TempPath), DownloadError> {
        let (file, path) = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".ts")
            .tempfile()?
            .into_parts();
        debug!(path = %path.display(), "Writing segments to temporary file");

        let (stats, mut file) = HlsStreamCoordinator::acquire(
            &media.segments,
            Arc::clone(&self.config),
            Arc::clone(&self.segment_fetcher),
            tokio::fs::File::from_std(file),
            on_progress,
        )
        .await?;
        file.flush().await?;
        file.sync_all().await?;

        Ok((stats, path))
    }

    /// Fetches a subtitle track and stores it as SRT in a temporary file.
    ///
    /// A track may be a single WebVTT file or a media playlist of WebVTT parts;
    /// parts are fetched in order and converted as one document.
    pub async fn fetch_subtitles(&self, track: &SubtitleTrack) -> Result<TempPath, DownloadError> {
        info!(url = %track.uri, "Fetching subtitles");
        let document = self.playlist_engine.fetch_document(&track.uri).await?;

        let vtt = if document.text().contains(PLAYLIST_MARKER) {
            let parts = parse_segments(document.text(), document.base_url())?;
            debug!(parts = parts.len(), "Subtitle track is a playlist");
            self.fetch_subtitle_parts(&parts).await?
        } else {
            document.text().to_string()
        };

        let srt = vtt_to_srt(&vtt);
        let path = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".srt")
            .tempfile()?
            .into_temp_path();
        tokio::fs::write(&path, srt.as_bytes()).await?;
        debug!(path = %path.display(), bytes = srt.len(), "Wrote converted subtitles");
        Ok(path)
    }

    async fn fetch_subtitle_parts(&self, parts: &[Url]) -> Result<String, DownloadError> {
        let mut combined = String::new();
        for part in parts {
            let document = self.playlist_engine.fetch_document(part).await?;
            if !combined.is_empty() {
                combined.push_str("\n\n");
            }
            combined.push_str(document.text());
        }
        Ok(combined)
    }

    /// Runs the whole pipeline for an already loaded playlist.
    ///
    /// Subtitles come from the first track the initial playlist declares.
    pub async fn download_playlist(
        &self,
        initial: InitialPlaylist,
        chooser: &mut dyn VariantChooser,
        muxer: &Muxer,
        options: DownloadOptions,
    ) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();

        let subtitle_track = if options.include_subtitles {
            initial.subtitle_tracks().into_iter().next()
        } else {
            None
        };
        let media = self.resolve_media_playlist(initial, chooser).await?;

        let subtitles = match &subtitle_track {
            Some(track) => Some(self.fetch_subtitles(track).await?),
            None => None,
        };

        let (stats, segments) = self
            .acquire_segments(&media, options.on_progress.clone())
            .await?;

        let with_subtitles = subtitles.is_some();
        mux_and_cleanup(
            muxer,
            MuxInputs {
                segments,
                subtitles,
            },
            &options.output,
        )
        .await?;

        let report = DownloadReport {
            output: options.output,
            segments: stats.segments,
            bytes_written: stats.bytes_written,
            retries: stats.retries,
            subtitles: with_subtitles,
            elapsed: started.elapsed(),
        };
        info!(
            output = %report.output.display(),
            segments = report.segments,
            bytes = report.bytes_written,
            "Download complete"
        );
        Ok(report)
    }

    /// Downloads the asset at `url` into `options.output`.
    pub async fn download(
        &self,
        url: &str,
        chooser: &mut dyn VariantChooser,
        muxer: &Muxer,
        options: DownloadOptions,
    ) -> Result<DownloadReport, DownloadError> {
        let initial = self.load_playlist(url).await?;
        self.download_playlist(initial, chooser, muxer, options)
            .await
    }
}
