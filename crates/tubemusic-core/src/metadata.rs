//! Media metadata as reported by the extractor, and file naming derived from it

use crate::error::ExtractorError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Longest file stem produced by [`sanitize_filename`], in characters
pub const MAX_FILENAME_CHARS: usize = 200;

const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// What a metadata-only extraction resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Track {
        title: Option<String>,
    },
    Collection {
        title: Option<String>,
        entries: Vec<Entry>,
    },
}

/// One item of a playlist or search listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl Metadata {
    pub fn title(&self) -> Option<&str> {
        match self {
            Metadata::Track { title } | Metadata::Collection { title, .. } => title.as_deref(),
        }
    }

    /// Entries of a collection; a single track has none
    pub fn entries(&self) -> &[Entry] {
        match self {
            Metadata::Track { .. } => &[],
            Metadata::Collection { entries, .. } => entries,
        }
    }

    /// Parse the document printed by `yt-dlp -J`
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        let raw: RawInfo =
            serde_json::from_str(json).map_err(|e| ExtractorError::MetadataParse(e.to_string()))?;
        Ok(raw.into())
    }
}

impl Entry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "_type")]
    kind: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<RawInfo> for Metadata {
    fn from(raw: RawInfo) -> Self {
        let is_collection = raw.entries.is_some() || raw.kind.as_deref() == Some("playlist");
        if !is_collection {
            return Metadata::Track { title: raw.title };
        }

        // Unavailable playlist items come through as nulls
        let entries = raw
            .entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|e| Entry {
                title: e.title,
                url: e.webpage_url.or(e.url).filter(|u| !u.trim().is_empty()),
            })
            .collect();

        Metadata::Collection {
            title: raw.title,
            entries,
        }
    }
}

/// Sanitize a title into a file name: drop reserved characters, replace
/// spaces with underscores and cap the length at [`MAX_FILENAME_CHARS`].
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Sanitized title, or `fallback` when the extractor reported none
pub fn file_stem(title: Option<&str>, fallback: &str) -> String {
    match title.map(sanitize_filename) {
        Some(stem) if !stem.is_empty() => stem,
        _ => fallback.to_string(),
    }
}

/// Final location of a converted track
pub fn track_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, extension))
}

/// yt-dlp output template writing `<dir>/<stem>.<ext>`; `%` in the stem is
/// escaped so it is taken literally.
pub fn output_template(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.%(ext)s", stem.replace('%', "%%")))
}

/// yt-dlp output template for playlist entries, which yt-dlp names itself;
/// the title is capped like [`sanitize_filename`] caps it.
pub fn playlist_entry_template(dir: &Path) -> PathBuf {
    dir.join(format!("%(title).{}s.%(ext)s", MAX_FILENAME_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Normal Title"), "Normal_Title");
        assert_eq!(sanitize_filename("AC/DC: Back in Black?"), "ACDC_Back_in_Black");
        assert_eq!(sanitize_filename(r#"<a>"b"\c|d*"#), "abcd");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn test_sanitize_removes_every_forbidden_char() {
        let nasty = "x<y>z:\"/\\|?*".repeat(40);
        let clean = sanitize_filename(&nasty);
        assert!(!clean.contains(&FORBIDDEN_CHARS[..]));
        assert!(!clean.contains(' '));
    }

    #[test]
    fn test_sanitize_truncates_by_chars() {
        let long = "é".repeat(450);
        let clean = sanitize_filename(&long);
        assert_eq!(clean.chars().count(), MAX_FILENAME_CHARS);
        assert!(sanitize_filename(&"a b".repeat(100)).chars().count() <= MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let long = "long name with spaces ".repeat(20);
        for input in [
            "Song",
            "  spaced  out  ",
            "What? Is: this/that",
            long.as_str(),
            "日本語 タイトル | live",
        ] {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_file_stem_fallback() {
        assert_eq!(file_stem(Some("My Song"), "Unknown_Track"), "My_Song");
        assert_eq!(file_stem(None, "Unknown_Track"), "Unknown_Track");
        assert_eq!(file_stem(Some("???"), "Unknown_Track_3"), "Unknown_Track_3");
    }

    #[test]
    fn test_output_template_escapes_percent() {
        let template = output_template(Path::new("out"), "100%_Pure");
        assert_eq!(template, Path::new("out").join("100%%_Pure.%(ext)s"));
        assert_eq!(
            track_path(Path::new("out"), "Song", "mp3"),
            Path::new("out").join("Song.mp3")
        );
    }

    #[test]
    fn test_playlist_entry_template() {
        assert_eq!(
            playlist_entry_template(Path::new("out/Mix")),
            Path::new("out/Mix").join("%(title).200s.%(ext)s")
        );
    }

    #[test]
    fn test_parse_single_video() {
        let json = r#"{"id":"abc","title":"Song","_type":"video","duration":200.5}"#;
        let meta = Metadata::from_json(json).unwrap();
        assert_eq!(meta, Metadata::Track { title: Some("Song".into()) });
        assert!(meta.entries().is_empty());
    }

    #[test]
    fn test_parse_flat_playlist() {
        let json = r#"{
            "_type": "playlist",
            "title": "Road Trip",
            "entries": [
                {"_type": "url", "title": "One", "url": "https://www.youtube.com/watch?v=1"},
                null,
                {"_type": "url", "title": "Two", "url": ""},
                {"title": "Three", "url": "https://x/3", "webpage_url": "https://www.youtube.com/watch?v=3"}
            ]
        }"#;
        let meta = Metadata::from_json(json).unwrap();
        assert_eq!(meta.title(), Some("Road Trip"));
        assert_eq!(
            meta.entries(),
            &[
                Entry::new("One", "https://www.youtube.com/watch?v=1"),
                Entry { title: Some("Two".into()), url: None },
                Entry::new("Three", "https://www.youtube.com/watch?v=3"),
            ]
        );
    }

    #[test]
    fn test_parse_playlist_without_entries_key() {
        let meta = Metadata::from_json(r#"{"_type":"playlist","title":"Empty"}"#).unwrap();
        assert!(matches!(meta, Metadata::Collection { ref entries, .. } if entries.is_empty()));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Metadata::from_json("not json"),
            Err(ExtractorError::MetadataParse(_))
        ));
    }
}
