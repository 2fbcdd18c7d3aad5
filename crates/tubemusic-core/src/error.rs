//! Error types for tubemusic-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TubeError>;

#[derive(Error, Debug)]
pub enum TubeError {
    #[error("{0}")]
    Extractor(#[from] ExtractorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TubeError {
    /// Whether the failure came from the extraction tool rather than from us
    pub fn is_extractor(&self) -> bool {
        matches!(self, TubeError::Extractor(_))
    }
}

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    NotFound,

    #[error("yt-dlp failed with exit code {code:?}: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("{0} is a playlist; choose a playlist option to download it")]
    NotATrack(String),

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Map a failed yt-dlp run onto the most specific variant its stderr allows
    pub fn classify(target: &str, code: Option<i32>, stderr: &str) -> Self {
        if stderr.contains("Video unavailable") || stderr.contains("Private video") {
            return ExtractorError::VideoUnavailable(target.to_string());
        }
        if stderr.contains("Unsupported URL") || stderr.contains("is not a valid URL") {
            return ExtractorError::UnsupportedUrl(target.to_string());
        }

        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
            .trim_start_matches("ERROR:")
            .trim()
            .to_string();

        ExtractorError::Failed { code, message }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
