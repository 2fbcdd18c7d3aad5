//! yt-dlp backed implementation of [`Extractor`]

use crate::error::ExtractorError;
use crate::extractor::{DownloadRequest, Extractor, Progress, ProgressStatus};
use crate::metadata::Metadata;
use regex::Regex;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Marks our machine-readable progress lines on yt-dlp's stdout
const PROGRESS_PREFIX: &str = "tubemusic-progress";

#[derive(Debug, Clone)]
pub struct YtDlp {
    yt_dlp_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(yt_dlp_path: PathBuf, ffmpeg_path: Option<PathBuf>) -> Self {
        Self {
            yt_dlp_path,
            ffmpeg_path,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.yt_dlp_path);
        // Ctrl-C drops the running flow; take the child down with it
        cmd.kill_on_drop(true).stdin(Stdio::null());
        cmd
    }

    fn metadata_args(target: &str, flat: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-J".into(), "--no-warnings".into()];
        if flat {
            args.push("--flat-playlist".into());
        } else {
            // A watch URL carrying `&list=` must resolve to the video alone
            args.push("--no-playlist".into());
        }
        args.push("--".into());
        args.push(target.into());
        args
    }

    fn download_args(&self, request: &DownloadRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            // Best audio stream, falling back to a combined one
            "-f",
            "bestaudio/best",
            "-x",
            "--audio-format",
            request.audio_format.codec(),
            "--audio-quality",
            "0",
            "--no-warnings",
            "--newline",
            "--progress-template",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(
            format!(
                "download:{}|%(progress.status)s|%(progress._percent_str)s|%(progress.filename)s",
                PROGRESS_PREFIX
            )
            .into(),
        );
        args.push("-o".into());
        args.push(request.output_template.clone().into_os_string());

        if request.playlist {
            args.push("--yes-playlist".into());
            // Entry names are chosen by yt-dlp here, so mirror sanitize_filename
            for (pattern, replacement) in [(r#"[<>:"/\\|?*]"#, ""), (" ", "_")] {
                args.push("--replace-in-metadata".into());
                args.push("title".into());
                args.push(pattern.into());
                args.push(replacement.into());
            }
        } else {
            args.push("--no-playlist".into());
        }

        if let Some(ref ffmpeg) = self.ffmpeg_path {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        args.push("--".into());
        args.push(request.url.clone().into());
        args
    }

    fn spawn_error(e: io::Error) -> ExtractorError {
        if e.kind() == io::ErrorKind::NotFound {
            ExtractorError::NotFound
        } else {
            ExtractorError::Io(e)
        }
    }
}

impl Extractor for YtDlp {
    async fn fetch_metadata(&self, target: &str, flat: bool) -> Result<Metadata, ExtractorError> {
        info!("Fetching metadata for: {} (flat: {})", target, flat);

        let output = self
            .command()
            .args(Self::metadata_args(target, flat))
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(ExtractorError::classify(target, output.status.code(), &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let metadata = Metadata::from_json(&stdout)?;
        debug!(
            "Resolved {:?} with {} entries",
            metadata.title(),
            metadata.entries().len()
        );
        Ok(metadata)
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<(), ExtractorError> {
        info!(
            "Downloading {} as {} to {}",
            request.url,
            request.audio_format,
            request.output_template.display()
        );

        let mut child = self
            .command()
            .args(self.download_args(request))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Self::spawn_error)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("yt-dlp stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("yt-dlp stderr was not captured"))?;

        // Drain both pipes together so neither can fill up and stall the child
        let read_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match parse_progress_line(&line) {
                    Some(progress) => on_progress(progress),
                    None if !line.trim().is_empty() => debug!("[yt-dlp] {}", line),
                    None => {}
                }
            }
            Ok::<_, io::Error>(())
        };
        let read_errors = async {
            let mut buf = String::new();
            BufReader::new(stderr).read_to_string(&mut buf).await?;
            Ok::<_, io::Error>(buf)
        };

        let (progress_result, stderr_result) = tokio::join!(read_progress, read_errors);
        progress_result?;
        let stderr_text = stderr_result?;

        let status = child.wait().await?;
        if !status.success() {
            debug!("yt-dlp stderr: {}", stderr_text);
            return Err(ExtractorError::classify(
                &request.url,
                status.code(),
                &stderr_text,
            ));
        }

        debug!("yt-dlp finished: {}", request.url);
        Ok(())
    }
}

fn percent_regex() -> &'static Regex {
    static PERCENT: OnceLock<Regex> = OnceLock::new();
    PERCENT.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid percent regex"))
}

/// Parse a line emitted through our `--progress-template`
pub fn parse_progress_line(line: &str) -> Option<Progress> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?.strip_prefix('|')?;
    let mut parts = rest.splitn(3, '|');

    let status = match parts.next()?.trim() {
        "downloading" => ProgressStatus::Downloading,
        "finished" => ProgressStatus::Finished,
        "error" => ProgressStatus::Error,
        _ => return None,
    };
    let percent = percent_regex()
        .captures(parts.next()?)
        .and_then(|c| c[1].parse::<f32>().ok())
        .map(|p| p.clamp(0.0, 100.0));
    let filename = parts.next().unwrap_or_default().trim().to_string();

    Some(Progress {
        status,
        percent,
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AudioFormat;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn request(playlist: bool) -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            output_template: PathBuf::from("music/Song.%(ext)s"),
            audio_format: AudioFormat::Mp3,
            playlist,
        }
    }

    #[test]
    fn test_metadata_args() {
        assert_eq!(
            strings(&YtDlp::metadata_args("ytsearch5:song", true)),
            ["-J", "--no-warnings", "--flat-playlist", "--", "ytsearch5:song"]
        );
        assert!(!strings(&YtDlp::metadata_args("u", false)).contains(&"--flat-playlist".to_string()));
    }

    #[test]
    fn test_track_metadata_args_ignore_enclosing_playlist() {
        let url = "https://www.youtube.com/watch?v=abc&list=PL1";
        assert_eq!(
            strings(&YtDlp::metadata_args(url, false)),
            ["-J", "--no-warnings", "--no-playlist", "--", url]
        );
        assert!(!strings(&YtDlp::metadata_args(url, true)).contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn test_single_download_args() {
        let ytdlp = YtDlp::new(PathBuf::from("yt-dlp"), None);
        let args = strings(&ytdlp.download_args(&request(false)));

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--audio-format") + 1], "mp3");
        assert_eq!(args[pos("-o") + 1], "music/Song.%(ext)s");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--replace-in-metadata".to_string()));
        assert!(!args.contains(&"--ffmpeg-location".to_string()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_playlist_download_args() {
        let ytdlp = YtDlp::new(PathBuf::from("yt-dlp"), Some(PathBuf::from("/opt/ffmpeg")));
        let args = strings(&ytdlp.download_args(&request(true)));

        assert!(args.contains(&"--yes-playlist".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "--replace-in-metadata").count(), 2);
        let pos = args.iter().position(|a| a == "--ffmpeg-location").unwrap();
        assert_eq!(args[pos + 1], "/opt/ffmpeg");
    }

    #[test]
    fn test_parse_progress_line() {
        let progress =
            parse_progress_line("tubemusic-progress|downloading|  45.2%|music/Song.webm").unwrap();
        assert_eq!(progress.status, ProgressStatus::Downloading);
        assert_eq!(progress.percent, Some(45.2));
        assert_eq!(progress.filename, "music/Song.webm");

        let done = parse_progress_line("tubemusic-progress|finished|100%|a|b.webm").unwrap();
        assert_eq!(done.status, ProgressStatus::Finished);
        assert_eq!(done.filename, "a|b.webm");
    }

    #[test]
    fn test_parse_progress_unknown_total() {
        let progress = parse_progress_line("tubemusic-progress|downloading|NA|x.webm").unwrap();
        assert_eq!(progress.percent, None);
    }

    #[test]
    fn test_parse_progress_ignores_other_output() {
        assert!(parse_progress_line("[ExtractAudio] Destination: Song.mp3").is_none());
        assert!(parse_progress_line("tubemusic-progress|paused|1%|x").is_none());
    }
}
