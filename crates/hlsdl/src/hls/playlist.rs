// HLS Playlist Engine: fetches playlist documents and turns them into parsed structures.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::parser::{MediaPlaylist, PlaylistDocument, SubtitleTrack, Variant};

#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    /// Fetches a playlist as text. No retry: any failure is fatal for the run.
    async fn fetch_document(&self, url: &Url) -> Result<PlaylistDocument, DownloadError>;

    async fn load_initial_playlist(&self, url: &str) -> Result<InitialPlaylist, DownloadError> {
        let playlist_url = Url::parse(url)
            .map_err(|e| DownloadError::InvalidUrl(format!("{url}: {e}")))?;
        let document = self.fetch_document(&playlist_url).await?;

        if document.is_master() {
            let variants = document.variants()?;
            info!(variants = variants.len(), "Master playlist detected");
            Ok(InitialPlaylist::Master { document, variants })
        } else {
            let media = MediaPlaylist::from_document(&document)?;
            info!(segments = media.segments.len(), "Media playlist detected");
            Ok(InitialPlaylist::Media(media))
        }
    }

    async fn load_media_playlist(&self, url: &Url) -> Result<MediaPlaylist, DownloadError> {
        let document = self.fetch_document(url).await?;
        if document.is_master() {
            return Err(DownloadError::Parse(format!(
                "expected a media playlist at {url}, got a master playlist"
            )));
        }
        MediaPlaylist::from_document(&document)
    }
}

/// First playlist of a run, before rendition selection.
#[derive(Debug, Clone)]
pub enum InitialPlaylist {
    Master {
        document: PlaylistDocument,
        variants: Vec<Variant>,
    },
    Media(MediaPlaylist),
}

impl InitialPlaylist {
    /// Subtitle tracks declared by this playlist, in source order.
    pub fn subtitle_tracks(&self) -> Vec<SubtitleTrack> {
        match self {
            InitialPlaylist::Master { document, .. } => document.subtitle_tracks(),
            InitialPlaylist::Media(media) => media.subtitles.clone(),
        }
    }

    pub fn variants(&self) -> &[Variant] {
        match self {
            InitialPlaylist::Master { variants, .. } => variants,
            InitialPlaylist::Media(_) => &[],
        }
    }
}

pub struct PlaylistEngine {
    http_client: Client,
    config: Arc<HlsConfig>,
}

impl PlaylistEngine {
    pub fn new(http_client: Client, config: Arc<HlsConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl PlaylistProvider for PlaylistEngine {
    async fn fetch_document(&self, url: &Url) -> Result<PlaylistDocument, DownloadError> {
        debug!(url = %url, "Fetching playlist");
        let response = self
            .http_client
            .get(url.clone())
            .timeout(self.config.playlist_config.playlist_fetch_timeout)
            .send()
            .await
            .map_err(|e| DownloadError::playlist_fetch(url, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::playlist_fetch(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        // Relative references resolve against where the document actually lives.
        let base_url = response.url().clone();
        if base_url != *url {
            debug!(from = %url, to = %base_url, "Playlist request was redirected");
        }

        let text = response
            .text()
            .await
            .map_err(|e| DownloadError::playlist_fetch(url, e))?;

        Ok(PlaylistDocument::new(text, base_url))
    }
}
