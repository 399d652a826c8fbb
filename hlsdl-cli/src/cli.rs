use clap::Parser;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Download an HLS (m3u8) stream into a single video file",
    long_about = "Downloads every segment of an HLS rendition concurrently, reassembles them\n\
                  in order and muxes the result (plus the first subtitle track, converted to\n\
                  SRT) into one container with ffmpeg.\n\
                  \n\
                  Run without a URL from a terminal to be prompted for the URL, the rendition\n\
                  and the output file name."
)]
pub struct CliArgs {
    /// Master or media playlist URL
    #[arg(help = "URL of the master or media playlist (prompted for when omitted)")]
    pub url: Option<String>,

    /// Output file
    #[arg(
        default_value = "video.mp4",
        help = "Output file; '.mp4' is appended when it has no extension"
    )]
    pub output: PathBuf,

    /// Preferred rendition
    #[arg(
        short,
        long,
        default_value = "1280x720",
        value_name = "WxH",
        help = "Rendition resolution to pick; falls back to the first rendition"
    )]
    pub resolution: String,

    /// Number of concurrent segment downloads
    #[arg(
        short,
        long,
        default_value = "8",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum number of segments downloaded at once"
    )]
    pub concurrency: u32,

    /// Attempt ceiling per segment
    #[arg(
        long,
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Attempts per segment before the download is aborted"
    )]
    pub retries: u32,

    /// Base retry delay
    #[arg(
        long,
        default_value = "1000",
        value_name = "MS",
        help = "Base delay between attempts in milliseconds, multiplied by the attempt number"
    )]
    pub retry_delay_ms: u64,

    /// Segment timeout in seconds
    #[arg(
        long,
        default_value = "10",
        value_name = "SECONDS",
        help = "Timeout for each segment request in seconds"
    )]
    pub timeout: u64,

    /// Overall HTTP request timeout in seconds
    #[arg(
        long,
        default_value = "0",
        value_name = "SECONDS",
        help = "Overall timeout in seconds for every HTTP request (0 disables it)"
    )]
    pub request_timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        value_name = "SECONDS",
        help = "Connection timeout in seconds (time to establish initial connection)"
    )]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(
        long,
        default_value = "10",
        value_name = "SECONDS",
        help = "Read timeout in seconds (maximum time between receiving data chunks)"
    )]
    pub read_timeout: u64,

    #[arg(long, help = "Do not follow HTTP redirects")]
    pub no_redirects: bool,

    /// Custom HTTP headers for download requests
    #[arg(
        long = "header",
        short = 'H',
        help = "Add custom HTTP header to requests (can be used multiple times). Format: 'Name: Value'",
        value_name = "HEADER"
    )]
    pub headers: Vec<String>,

    #[arg(long, default_value = "Mozilla/5.0", help = "User-Agent sent with every request")]
    pub user_agent: String,

    #[arg(
        long,
        default_value = "https://player.videasy.net",
        help = "Origin header sent with every request"
    )]
    pub origin: String,

    #[arg(
        long,
        default_value = "https://player.videasy.net/",
        help = "Referer header sent with every request"
    )]
    pub referer: String,

    /// Muxer binary
    #[arg(
        long,
        value_name = "PATH",
        help = "Path to the ffmpeg binary (default: ffmpeg on PATH)"
    )]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long, help = "Skip subtitle download and embedding")]
    pub no_subs: bool,

    #[arg(long, help = "Do not draw a progress bar")]
    pub no_progress: bool,

    #[arg(long, help = "Never prompt; a missing URL is an error")]
    pub no_interactive: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    #[arg(long, value_name = "PATH", help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,
}
