use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use hlsdl_engine::hls::InitialPlaylist;
use hlsdl_engine::{
    DownloadOptions, DownloaderConfig, HlsConfig, HlsDownloader, Muxer, VariantChooser,
    VariantSelectionPolicy,
};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

mod cli;
mod error;
mod prompt;
mod utils;

use cli::CliArgs;
use error::AppError;
use prompt::Prompter;
use utils::progress::ProgressManager;
use utils::{format_bytes, format_duration, normalize_output_path, parse_headers};

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) -> Result<(), AppError> {
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let (writer, ansi) = match &args.log_file {
        Some(path) => {
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            (
                BoxMakeWriter::new(std::io::stderr.and(Arc::new(log_file))),
                false,
            )
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
        ),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))
}

fn build_config(args: &CliArgs) -> Result<HlsConfig, AppError> {
    let download_config = DownloaderConfig::builder()
        .with_timeout(Duration::from_secs(args.request_timeout))
        .with_connect_timeout(Duration::from_secs(args.connect_timeout))
        .with_read_timeout(Duration::from_secs(args.read_timeout))
        .with_follow_redirects(!args.no_redirects)
        .with_user_agent(&args.user_agent)
        .with_origin(&args.origin)
        .with_referer(&args.referer)
        .with_headers(parse_headers(&args.headers)?)
        .build();

    let concurrency = usize::try_from(args.concurrency)
        .map_err(|_| AppError::InvalidInput("Invalid concurrency".to_string()))?;

    Ok(HlsConfig::builder()
        .with_base_config(download_config)
        .variant_selection_policy(VariantSelectionPolicy::TargetResolution(
            args.resolution.clone(),
        ))
        .download_concurrency(concurrency)
        .segment_attempts(args.retries)
        .segment_retry_delay(Duration::from_millis(args.retry_delay_ms))
        .segment_timeout(Duration::from_secs(args.timeout))
        .build())
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    let interactive = args.url.is_none();
    if interactive && (args.no_interactive || !std::io::stdin().is_terminal()) {
        CliArgs::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "a playlist URL is required when not running interactively",
            )
            .exit();
    }

    init_logging(&args)?;

    let config = build_config(&args)?;
    // Fail before any network work if the muxer is missing.
    let muxer = Muxer::locate(args.ffmpeg.as_deref())?;
    let downloader = HlsDownloader::new(config)?;

    let mut prompter = Prompter::stdio();
    let url = match &args.url {
        Some(url) => url.clone(),
        None => prompter.prompt_url()?,
    };

    let initial = downloader.load_playlist(&url).await?;

    // Interactive runs pick the rendition up front so the output prompt comes last.
    let mut policy = match &initial {
        InitialPlaylist::Master { variants, .. } if interactive => {
            VariantSelectionPolicy::Index(prompter.choose(variants)?)
        }
        _ => downloader
            .config()
            .playlist_config
            .variant_selection_policy
            .clone(),
    };
    let output = if interactive {
        prompter.prompt_output()?
    } else {
        normalize_output_path(&args.output)
    };
    drop(prompter);

    let progress_manager = if args.no_progress {
        ProgressManager::new_disabled()
    } else {
        ProgressManager::new()
    };
    let mut options = DownloadOptions::new(output).with_subtitles(!args.no_subs);
    if !progress_manager.is_disabled() {
        let manager = progress_manager.clone();
        options = options.with_progress(Arc::new(move |event| manager.handle_event(event)));
    }

    let report = match downloader
        .download_playlist(initial, &mut policy, &muxer, options)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            progress_manager.abandon();
            return Err(e.into());
        }
    };

    info!(
        "Saved {} ({} segments, {}{}) in {}",
        report.output.display(),
        report.segments,
        format_bytes(report.bytes_written),
        if report.subtitles { ", with subtitles" } else { "" },
        format_duration(report.elapsed)
    );
    if report.retries > 0 {
        info!(retries = report.retries, "Some segments needed more than one attempt");
    }
    Ok(())
}
