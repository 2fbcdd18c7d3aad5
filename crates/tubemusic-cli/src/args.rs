use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tubemusic_core::format::AudioFormat;

#[derive(Parser)]
#[command(name = "tubemusic")]
#[command(author, version, about = "Download music from YouTube through an interactive menu")]
pub struct Cli {
    /// Audio format downloads are converted into (overrides the config file)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, env = "TUBEMUSIC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// MP3 - Lossy, widely compatible
    Mp3,
    /// M4A - AAC in an MP4 container
    M4a,
    /// AAC - Lossy, good quality/size ratio
    Aac,
    /// Opus - Lossy, best quality/size ratio
    Opus,
    /// Vorbis - Lossy, Ogg container
    Vorbis,
    /// FLAC - Lossless compression
    Flac,
    /// WAV - Uncompressed PCM
    Wav,
}

impl From<FormatArg> for AudioFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mp3 => AudioFormat::Mp3,
            FormatArg::M4a => AudioFormat::M4a,
            FormatArg::Aac => AudioFormat::Aac,
            FormatArg::Opus => AudioFormat::Opus,
            FormatArg::Vorbis => AudioFormat::Vorbis,
            FormatArg::Flac => AudioFormat::Flac,
            FormatArg::Wav => AudioFormat::Wav,
        }
    }
}
