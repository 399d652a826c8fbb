use reqwest::Client;
use tracing::debug;

use crate::{DownloadError, DownloaderConfig};

/// Create the shared reqwest Client for a run from the provided configuration.
///
/// The client is cheap to clone and is shared by every playlist fetch and every
/// segment worker, so all requests carry the same player-context headers.
pub fn create_client(config: &DownloaderConfig) -> Result<Client, DownloadError> {
    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(16)
        .user_agent(&config.user_agent)
        .default_headers(config.default_headers())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    if !config.read_timeout.is_zero() {
        client_builder = client_builder.read_timeout(config.read_timeout);
    }

    debug!(
        user_agent = %config.user_agent,
        origin = ?config.origin,
        referer = ?config.referer,
        "Building HTTP client"
    );

    client_builder.build().map_err(DownloadError::from)
}
