//! The boundary to the external extraction tool

use crate::error::ExtractorError;
use crate::format::AudioFormat;
use crate::metadata::Metadata;
use std::path::PathBuf;

/// What to download and where the postprocessed audio should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// yt-dlp output template, e.g. `<dir>/<stem>.%(ext)s`
    pub output_template: PathBuf,
    pub audio_format: AudioFormat,
    /// Follow every entry of a playlist URL instead of a single video
    pub playlist: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Error,
}

/// One progress report from a running download
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub status: ProgressStatus,
    /// 0.0..=100.0 when the total size is known
    pub percent: Option<f32>,
    pub filename: String,
}

/// Metadata resolution and download+transcode, as offered by yt-dlp.
///
/// Flows only ever talk to this trait, so they can be driven by a fake in
/// tests.
#[allow(async_fn_in_trait)]
pub trait Extractor {
    /// Resolve metadata without downloading media. With `flat`, playlist and
    /// search entries are listed without resolving each one.
    async fn fetch_metadata(&self, target: &str, flat: bool) -> Result<Metadata, ExtractorError>;

    /// Download and convert, reporting progress synchronously through
    /// `on_progress`.
    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<(), ExtractorError>;
}

/// Target understood by the extractor as "top `count` search results"
pub fn search_target(query: &str, count: usize) -> String {
    format!("ytsearch{}:{}", count, query.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_target() {
        assert_eq!(search_target("  lofi beats ", 5), "ytsearch5:lofi beats");
    }
}
