//! tubemusic-core: download flows and yt-dlp bridge for the tubemusic shell

pub mod config;
pub mod console;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod format;
pub mod metadata;
pub mod orchestrator;
pub mod shell;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, TubeError};
