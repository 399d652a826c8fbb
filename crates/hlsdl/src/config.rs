use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_ORIGIN: &str = "https://player.videasy.net";
const DEFAULT_REFERER: &str = "https://player.videasy.net/";

/// HTTP client configuration shared by every playlist and segment request.
///
/// The value is immutable once built and is only ever borrowed by the fetchers;
/// [`create_client`](crate::create_client) turns it into the single shared
/// `reqwest::Client` of a run.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Overall timeout for a single HTTP request. Zero disables it.
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Read timeout (maximum time between receiving data chunks)
    pub read_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// User agent string
    pub user_agent: String,

    /// `Origin` header expected by the media origin's player context
    pub origin: Option<String>,

    /// `Referer` header expected by the media origin's player context
    pub referer: Option<String>,

    /// Custom HTTP headers for requests. Applied last, so they win over
    /// the origin/referer defaults.
    pub headers: HeaderMap,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            origin: Some(DEFAULT_ORIGIN.to_owned()),
            referer: Some(DEFAULT_REFERER.to_owned()),
            headers: HeaderMap::new(),
        }
    }
}

impl DownloaderConfig {
    pub fn builder() -> crate::builder::DownloaderConfigBuilder {
        crate::builder::DownloaderConfigBuilder::new()
    }

    /// Headers attached to every request: player context first, then custom headers.
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(origin) = self.origin.as_deref() {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(reqwest::header::ORIGIN, value);
            }
        }
        if let Some(referer) = self.referer.as_deref() {
            if let Ok(value) = HeaderValue::from_str(referer) {
                headers.insert(reqwest::header::REFERER, value);
            }
        }

        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}
