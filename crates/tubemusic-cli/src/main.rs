mod args;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Cli;
use terminal::ConsoleTerminal;
use tubemusic_core::{
    config::Config, downloader::YtDlp, format::AudioFormat, orchestrator::Orchestrator,
    shell::Shell,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet by default so log lines don't interleave with prompts
    let filter = match cli.verbose {
        0 => "tubemusic=warn",
        1 => "tubemusic=info",
        2 => "tubemusic=debug",
        3 => "tubemusic=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let yt_dlp = config
        .yt_dlp_path()
        .context("yt-dlp is required. Install with: pip install yt-dlp")?;
    let ffmpeg = match config.ffmpeg_path() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("{}; audio conversion will fail until ffmpeg is installed", e);
            None
        }
    };

    let audio_format = cli
        .format
        .map(AudioFormat::from)
        .unwrap_or(config.output.audio_format);
    info!(
        "Using yt-dlp at {}, converting to {}",
        yt_dlp.display(),
        audio_format
    );

    let orchestrator = Orchestrator::new(
        YtDlp::new(yt_dlp, ffmpeg),
        audio_format,
        config.search.results,
    );
    let mut shell = Shell::new(
        orchestrator,
        ConsoleTerminal::new(),
        config.output.default_directory.clone(),
    );

    shell.run(tokio::signal::ctrl_c).await?;
    Ok(())
}
