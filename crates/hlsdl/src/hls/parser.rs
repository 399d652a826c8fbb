//! M3U8 parsing on top of `m3u8-rs`.
//!
//! Only what is needed to go from a master playlist to a list of segment URLs
//! is kept: stream variants, `TYPE=SUBTITLES` renditions and segment URIs.
//! Every relative reference is resolved against the base URL of the document
//! it appears in.

use m3u8_rs::{AlternativeMediaType, Playlist, parse_playlist_res};
use tracing::{trace, warn};
use url::Url;

use crate::DownloadError;

/// Raw playlist text plus the URL relative references resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDocument {
    text: String,
    base_url: Url,
}

impl PlaylistDocument {
    pub fn new(text: impl Into<String>, base_url: Url) -> Self {
        Self {
            text: text.into(),
            base_url,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_master(&self) -> bool {
        is_master(&self.text)
    }

    pub fn variants(&self) -> Result<Vec<Variant>, DownloadError> {
        parse_variants(&self.text, &self.base_url)
    }

    pub fn subtitle_tracks(&self) -> Vec<SubtitleTrack> {
        parse_subtitle_tracks(&self.text, &self.base_url)
    }
}

/// One rendition listed by a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// `RESOLUTION` attribute as `WxH`, `None` when the tag has none.
    pub resolution: Option<String>,
    pub playlist_url: Url,
}

impl Variant {
    pub fn resolution_label(&self) -> &str {
        self.resolution.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub uri: Url,
}

/// Ordered segment list of one rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlaylist {
    pub url: Url,
    pub segments: Vec<Url>,
    pub subtitles: Vec<SubtitleTrack>,
}

impl MediaPlaylist {
    /// Parses a media playlist document. Fails when it lists no segments.
    pub fn from_document(document: &PlaylistDocument) -> Result<Self, DownloadError> {
        let segments = parse_segments(document.text(), document.base_url())?;
        if segments.is_empty() {
            return Err(DownloadError::Parse(format!(
                "media playlist {} contains no segments",
                document.base_url()
            )));
        }
        Ok(Self {
            url: document.base_url().clone(),
            segments,
            subtitles: document.subtitle_tracks(),
        })
    }
}

fn parse_playlist(text: &str) -> Result<Playlist, DownloadError> {
    parse_playlist_res(text.as_bytes())
        .map_err(|e| DownloadError::Parse(format!("failed to parse playlist: {e}")))
}

/// True iff the text parses as a master playlist.
pub fn is_master(text: &str) -> bool {
    matches!(parse_playlist(text), Ok(Playlist::MasterPlaylist(_)))
}

fn resolve(base_url: &Url, reference: &str) -> Result<Url, DownloadError> {
    base_url.join(reference).map_err(|e| {
        DownloadError::Parse(format!("cannot resolve '{reference}' against {base_url}: {e}"))
    })
}

/// Variants in source order. A master playlist without any variant is an error.
pub fn parse_variants(text: &str, base_url: &Url) -> Result<Vec<Variant>, DownloadError> {
    let master = match parse_playlist(text)? {
        Playlist::MasterPlaylist(pl) => pl,
        Playlist::MediaPlaylist(_) => {
            return Err(DownloadError::Parse(format!(
                "{base_url} is a media playlist, not a master playlist"
            )));
        }
    };

    let mut variants = Vec::new();
    for stream in master.variants.iter().filter(|v| !v.is_i_frame) {
        if stream.uri.trim().is_empty() {
            warn!("Variant without playlist reference, skipping");
            continue;
        }
        let resolution = stream
            .resolution
            .map(|r| format!("{}x{}", r.width, r.height));
        let playlist_url = resolve(base_url, stream.uri.trim())?;
        trace!(?resolution, url = %playlist_url, "Found variant");
        variants.push(Variant {
            resolution,
            playlist_url,
        });
    }

    if variants.is_empty() {
        return Err(DownloadError::Parse(format!(
            "master playlist {base_url} lists no variants"
        )));
    }
    Ok(variants)
}

/// Segment URIs resolved against `base_url`, in playback order.
pub fn parse_segments(text: &str, base_url: &Url) -> Result<Vec<Url>, DownloadError> {
    match parse_playlist(text)? {
        Playlist::MediaPlaylist(pl) => pl
            .segments
            .iter()
            .map(|segment| resolve(base_url, segment.uri.trim()))
            .collect(),
        Playlist::MasterPlaylist(_) => Err(DownloadError::Parse(format!(
            "{base_url} is a master playlist, expected a media playlist"
        ))),
    }
}

/// Subtitle renditions declared through `#EXT-X-MEDIA:TYPE=SUBTITLES,...,URI="..."`.
pub fn parse_subtitle_tracks(text: &str, base_url: &Url) -> Vec<SubtitleTrack> {
    let Ok(Playlist::MasterPlaylist(master)) = parse_playlist(text) else {
        return Vec::new();
    };
    master
        .alternatives
        .iter()
        .filter(|media| media.media_type == AlternativeMediaType::Subtitles)
        .filter_map(|media| media.uri.as_deref())
        .filter_map(|uri| match base_url.join(uri) {
            Ok(uri) => Some(SubtitleTrack { uri }),
            Err(e) => {
                warn!(uri, error = %e, "Ignoring unresolvable subtitle URI");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
        #EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"subs\",NAME=\"English\",URI=\"subs/en.m3u8\"\n\
        #EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"subs\",NAME=\"German\",URI=\"subs/de.m3u8\"\n\
        #EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"Main\",URI=\"audio.m3u8\"\n\
        #EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080\n\
        1080p/index.m3u8\n\
        #EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720,CODECS=\"avc1.4d401f\"\n\
        720p/index.m3u8\n\
        #EXT-X-STREAM-INF:BANDWIDTH=800000\n\
        https://cdn.example.com/low/index.m3u8\n";

    const MEDIA: &str = "#EXTM3U\n\
        #EXT-X-VERSION:3\n\
        #EXT-X-TARGETDURATION:6\n\
        #EXTINF:6.0,\n\
        seg0.ts\n\
        #EXTINF:6.0,\n\
        /abs/seg1.ts\n\
        #EXTINF:6.0,\n\
        https://other.example.com/seg2.ts?token=1\n\
        #EXT-X-ENDLIST\n";

    fn base() -> Url {
        Url::parse("https://example.com/video/master.m3u8").unwrap()
    }

    #[test]
    fn test_is_master() {
        assert!(is_master(MASTER));
        assert!(!is_master(MEDIA));
    }

    #[test]
    fn test_parse_variants_in_source_order() {
        let variants = parse_variants(MASTER, &base()).unwrap();
        assert_eq!(variants.len(), 3);

        assert_eq!(variants[0].resolution.as_deref(), Some("1920x1080"));
        assert_eq!(
            variants[0].playlist_url.as_str(),
            "https://example.com/video/1080p/index.m3u8"
        );
        assert_eq!(variants[1].resolution.as_deref(), Some("1280x720"));
        assert_eq!(
            variants[1].playlist_url.as_str(),
            "https://example.com/video/720p/index.m3u8"
        );
        assert_eq!(variants[2].resolution, None);
        assert_eq!(variants[2].resolution_label(), "unknown");
        assert_eq!(
            variants[2].playlist_url.as_str(),
            "https://cdn.example.com/low/index.m3u8"
        );
    }

    #[test]
    fn test_master_without_variants_is_an_error() {
        let text = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\n";
        let err = parse_variants(text, &base()).unwrap_err();
        assert!(matches!(err, DownloadError::Parse(_)));
    }

    #[test]
    fn test_i_frame_variants_are_skipped() {
        let text = "#EXTM3U\n\
            #EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=100000,RESOLUTION=640x360,URI=\"iframes.m3u8\"\n\
            #EXT-X-STREAM-INF:BANDWIDTH=900000,RESOLUTION=640x360\n\
            360p.m3u8\n";
        let variants = parse_variants(text, &base()).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].resolution.as_deref(), Some("640x360"));
        assert_eq!(
            variants[0].playlist_url.as_str(),
            "https://example.com/video/360p.m3u8"
        );
    }

    #[test]
    fn test_playlist_kind_mismatch_is_an_error() {
        assert!(matches!(
            parse_variants(MEDIA, &base()),
            Err(DownloadError::Parse(_))
        ));
        assert!(matches!(
            parse_segments(MASTER, &base()),
            Err(DownloadError::Parse(_))
        ));
        assert!(parse_subtitle_tracks(MEDIA, &base()).is_empty());
    }

    #[test]
    fn test_parse_segments_resolves_in_order() {
        let base = Url::parse("https://example.com/video/720p/index.m3u8").unwrap();
        let segments = parse_segments(MEDIA, &base).unwrap();
        let urls: Vec<&str> = segments.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/video/720p/seg0.ts",
                "https://example.com/abs/seg1.ts",
                "https://other.example.com/seg2.ts?token=1",
            ]
        );
    }

    #[test]
    fn test_media_playlist_without_segments_is_an_error() {
        let document = PlaylistDocument::new("#EXTM3U\n#EXT-X-ENDLIST\n", base());
        let err = MediaPlaylist::from_document(&document).unwrap_err();
        assert!(matches!(err, DownloadError::Parse(_)));
    }

    #[test]
    fn test_parse_subtitle_tracks() {
        let tracks = parse_subtitle_tracks(MASTER, &base());
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0].uri.as_str(),
            "https://example.com/video/subs/en.m3u8"
        );
        assert_eq!(
            tracks[1].uri.as_str(),
            "https://example.com/video/subs/de.m3u8"
        );
    }

    #[test]
    fn test_crlf_playlists() {
        let text = MEDIA.replace('\n', "\r\n");
        let segments = parse_segments(&text, &base()).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].as_str(), "https://example.com/video/seg0.ts");
    }
}
