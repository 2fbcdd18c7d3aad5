//! The four download flows: single, playlist auto, playlist manual, search

use crate::console::{Terminal, Tone};
use crate::error::{ExtractorError, Result, TubeError};
use crate::extractor::{search_target, DownloadRequest, Extractor};
use crate::format::AudioFormat;
use crate::metadata::{
    file_stem, output_template, playlist_entry_template, track_path, Metadata,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const UNKNOWN_TRACK: &str = "Unknown_Track";
const UNKNOWN_PLAYLIST: &str = "Playlist";

/// Runs download flows against an [`Extractor`], talking to the user
/// through a [`Terminal`]. Every public flow reports its own failures and
/// returns normally so the shell keeps going.
#[derive(Debug)]
pub struct Orchestrator<E> {
    extractor: E,
    audio_format: AudioFormat,
    search_results: usize,
}

impl<E: Extractor> Orchestrator<E> {
    pub fn new(extractor: E, audio_format: AudioFormat, search_results: usize) -> Self {
        Self {
            extractor,
            audio_format,
            search_results,
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Download one URL unless its converted file already exists
    pub async fn single<T: Terminal>(&self, term: &mut T, url: &str, dest: &Path) {
        if let Err(e) = self.try_single(term, url, dest).await {
            report(term, &e);
        }
    }

    /// Hand a whole playlist to the extractor in one call
    pub async fn playlist_auto<T: Terminal>(&self, term: &mut T, url: &str, dest: &Path) {
        if let Err(e) = self.try_playlist_auto(term, url, dest).await {
            report(term, &e);
        }
    }

    /// Walk a playlist asking before each song
    pub async fn playlist_manual<T: Terminal>(&self, term: &mut T, url: &str, dest: &Path) {
        if let Err(e) = self.try_playlist_manual(term, url, dest).await {
            report(term, &e);
        }
    }

    /// Search, let the user pick one result, then download it
    pub async fn search<T: Terminal>(&self, term: &mut T, query: &str, dest: &Path) {
        if let Err(e) = self.try_search(term, query, dest).await {
            report(term, &e);
        }
    }

    async fn try_single<T: Terminal>(&self, term: &mut T, url: &str, dest: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dest).await?;

        let metadata = self.extractor.fetch_metadata(url, false).await?;
        if let Metadata::Collection { .. } = metadata {
            return Err(ExtractorError::NotATrack(url.to_string()).into());
        }
        let stem = file_stem(metadata.title(), UNKNOWN_TRACK);

        self.download_track(term, url, &stem, dest).await
    }

    async fn try_playlist_auto<T: Terminal>(
        &self,
        term: &mut T,
        url: &str,
        dest: &Path,
    ) -> Result<()> {
        let name = self.playlist_name(url).await;
        let dir = dest.join(name);
        tokio::fs::create_dir_all(&dir).await?;

        term.say(
            Tone::Info,
            &format!("Downloading playlist to: {}", dir.display()),
        );

        let request = DownloadRequest {
            url: url.to_string(),
            output_template: playlist_entry_template(&dir),
            audio_format: self.audio_format,
            playlist: true,
        };
        self.run_download(term, &request).await?;

        term.say(Tone::Success, "Playlist download completed!");
        Ok(())
    }

    async fn try_playlist_manual<T: Terminal>(
        &self,
        term: &mut T,
        url: &str,
        dest: &Path,
    ) -> Result<()> {
        term.say(Tone::Info, &format!("Fetching playlist info: {}", url));
        let metadata = self.extractor.fetch_metadata(url, true).await?;

        if metadata.entries().is_empty() {
            term.say(Tone::Failure, "No videos found in the playlist.");
            return Ok(());
        }

        let dir = dest.join(file_stem(metadata.title(), UNKNOWN_PLAYLIST));
        tokio::fs::create_dir_all(&dir).await?;

        for (index, entry) in metadata.entries().iter().enumerate() {
            let index = index + 1;
            let stem = file_stem(entry.title.as_deref(), &format!("{}_{}", UNKNOWN_TRACK, index));

            term.say(Tone::Plain, "");
            term.say(Tone::Entry, &format!("Song {}: {}", index, stem));

            let Some(song_url) = entry.url.as_deref() else {
                warn!("Playlist entry {} ({}) has no URL", index, stem);
                term.say(
                    Tone::Warning,
                    &format!("Skipping {}: no URL reported for this entry", stem),
                );
                continue;
            };
            term.say(Tone::Link, &format!("URL: {}", song_url));

            match ask_yes_no(term, "Download this song? (y/n): ").await? {
                None => return Ok(()),
                Some(false) => term.say(Tone::Notice, &format!("Skipped: {}", stem)),
                Some(true) => {
                    // One bad entry must not end the walk
                    if let Err(e) = self.download_track(term, song_url, &stem, &dir).await {
                        report(term, &e);
                    }
                }
            }
        }

        term.say(Tone::Success, "Playlist processing completed!");
        Ok(())
    }

    async fn try_search<T: Terminal>(&self, term: &mut T, query: &str, dest: &Path) -> Result<()> {
        term.say(Tone::Info, &format!("Searching for: {}", query));
        let results = self
            .extractor
            .fetch_metadata(&search_target(query, self.search_results), true)
            .await?;

        let entries = results.entries();
        if entries.is_empty() {
            term.say(Tone::Failure, "No results found.");
            return Ok(());
        }

        for (index, entry) in entries.iter().enumerate() {
            term.say(
                Tone::Entry,
                &format!(
                    "{}. {}",
                    index + 1,
                    entry.title.as_deref().unwrap_or("Unknown Title")
                ),
            );
            term.say(
                Tone::Link,
                &format!("URL: {}", entry.url.as_deref().unwrap_or("Unknown URL")),
            );
        }

        let Some(choice) = ask_selection(term, entries.len()).await? else {
            return Ok(());
        };
        let Some(choice) = choice else {
            term.say(Tone::Notice, "Search download skipped.");
            return Ok(());
        };

        let selected = &entries[choice - 1];
        let stem = file_stem(selected.title.as_deref(), UNKNOWN_TRACK);
        let Some(url) = selected.url.as_deref() else {
            term.say(
                Tone::Warning,
                &format!("No URL available for {}, nothing to download", stem),
            );
            return Ok(());
        };

        term.say(Tone::Info, &format!("Downloading: {}", stem));
        self.try_single(term, url, dest).await
    }

    /// Sanitized playlist title; a failed lookup falls back to a fixed name
    async fn playlist_name(&self, url: &str) -> String {
        match self.extractor.fetch_metadata(url, true).await {
            Ok(metadata) => file_stem(metadata.title(), UNKNOWN_PLAYLIST),
            Err(e) => {
                warn!("Could not resolve playlist title for {}: {}", url, e);
                UNKNOWN_PLAYLIST.to_string()
            }
        }
    }

    /// Existence check, then download of a single item named `stem`
    async fn download_track<T: Terminal>(
        &self,
        term: &mut T,
        url: &str,
        stem: &str,
        dir: &Path,
    ) -> Result<()> {
        let path = track_path(dir, stem, self.audio_format.extension());
        if path.exists() {
            info!("Already downloaded: {}", path.display());
            term.say(
                Tone::Notice,
                &format!("Skipping {}: File already exists", stem),
            );
            return Ok(());
        }

        term.say(Tone::Info, &format!("Starting download: {}", stem));
        let request = DownloadRequest {
            url: url.to_string(),
            output_template: output_template(dir, stem),
            audio_format: self.audio_format,
            playlist: false,
        };
        self.run_download(term, &request).await?;

        term.say(Tone::Success, &format!("Completed: {}", stem));
        Ok(())
    }

    async fn run_download<T: Terminal>(
        &self,
        term: &mut T,
        request: &DownloadRequest,
    ) -> std::result::Result<(), ExtractorError> {
        let result = self
            .extractor
            .download(request, &mut |progress| term.progress(&progress))
            .await;
        term.finish_progress();
        result
    }
}

/// Where a flow resolved its destination to
pub fn resolve_destination(answer: &str, default_dir: &Path) -> PathBuf {
    let answer = answer.trim();
    if answer.is_empty() {
        default_dir.to_path_buf()
    } else {
        PathBuf::from(answer)
    }
}

fn report<T: Terminal>(term: &mut T, err: &TubeError) {
    if err.is_extractor() {
        warn!("Extractor failure: {}", err);
        term.say(Tone::Failure, &format!("Download error: {}", err));
    } else {
        error!("Flow failed: {}", err);
        term.say(Tone::Failure, &format!("Error: {}", err));
    }
}

/// `Some(true)` for y, `Some(false)` for n, `None` once input is closed
async fn ask_yes_no<T: Terminal>(term: &mut T, question: &str) -> std::io::Result<Option<bool>> {
    loop {
        let Some(answer) = term.ask(question).await? else {
            return Ok(None);
        };
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(Some(true)),
            "n" => return Ok(Some(false)),
            _ => term.say(Tone::Failure, "Please enter 'y' or 'n'."),
        }
    }
}

/// Outer `None` once input is closed, inner `None` when the user chose 0,
/// otherwise a 1-based index no larger than `count`
async fn ask_selection<T: Terminal>(
    term: &mut T,
    count: usize,
) -> std::io::Result<Option<Option<usize>>> {
    loop {
        let Some(answer) = term.ask("Enter number to download (0 to skip): ").await? else {
            return Ok(None);
        };
        match answer.trim().parse::<usize>() {
            Ok(0) => return Ok(Some(None)),
            Ok(n) if n <= count => return Ok(Some(Some(n))),
            Ok(_) => term.say(
                Tone::Failure,
                &format!("Invalid selection. Enter a number between 1 and {}.", count),
            ),
            Err(_) => term.say(Tone::Failure, "Please enter a valid number."),
        }
    }
}
