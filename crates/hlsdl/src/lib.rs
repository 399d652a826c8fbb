//! # hlsdl-engine
//!
//! A library for downloading HTTP Live Streaming assets into a single file.
//!
//! ## Features
//!
//! - Master and media playlist parsing with redirect-aware URL resolution
//! - Automatic or caller-driven rendition selection
//! - Concurrent segment downloads with retry and strictly ordered output
//! - WebVTT to SRT subtitle conversion
//! - Stream-copy muxing through `ffmpeg`

pub mod builder;
pub mod config;
pub mod downloader;
pub mod error;
pub mod hls;
pub mod mux;
pub mod subtitle;

pub use builder::DownloaderConfigBuilder;
pub use config::DownloaderConfig;
pub use error::DownloadError;

pub use downloader::create_client;

// Re-export the HLS pipeline entry points
pub use hls::{
    DownloadOptions, DownloadReport, HlsConfig, HlsConfigBuilder, HlsDownloader, OnProgress,
    ProgressEvent, VariantChooser, VariantSelectionPolicy,
};
pub use mux::{MuxInputs, Muxer, mux_and_cleanup};
pub use subtitle::vtt_to_srt;
