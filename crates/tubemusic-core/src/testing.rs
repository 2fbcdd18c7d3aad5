//! Fakes for driving flows and the shell in tests

use crate::console::{Terminal, Tone};
use crate::error::ExtractorError;
use crate::extractor::{DownloadRequest, Extractor, Progress, ProgressStatus};
use crate::metadata::Metadata;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::PathBuf;

/// Extractor answering from canned metadata and recording every call
#[derive(Debug, Default)]
pub struct FakeExtractor {
    metadata: HashMap<String, Metadata>,
    failing: HashSet<String>,
    create_files: bool,
    fetches: RefCell<Vec<(String, bool)>>,
    downloads: RefCell<Vec<DownloadRequest>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, target: &str, metadata: Metadata) -> Self {
        self.metadata.insert(target.to_string(), metadata);
        self
    }

    pub fn with_track(self, url: &str, title: &str) -> Self {
        self.with_metadata(
            url,
            Metadata::Track {
                title: Some(title.to_string()),
            },
        )
    }

    pub fn failing_download(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Write an empty file where a real download would have landed
    pub fn creating_files(mut self) -> Self {
        self.create_files = true;
        self
    }

    pub fn fetches(&self) -> Vec<(String, bool)> {
        self.fetches.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<DownloadRequest> {
        self.downloads.borrow().clone()
    }

    fn landed_path(request: &DownloadRequest) -> PathBuf {
        let template = request.output_template.to_string_lossy();
        let path = template
            .replace("%(ext)s", request.audio_format.extension())
            .replace("%%", "%");
        PathBuf::from(path)
    }
}

impl Extractor for FakeExtractor {
    async fn fetch_metadata(&self, target: &str, flat: bool) -> Result<Metadata, ExtractorError> {
        self.fetches.borrow_mut().push((target.to_string(), flat));
        self.metadata
            .get(target)
            .cloned()
            .ok_or_else(|| ExtractorError::UnsupportedUrl(target.to_string()))
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<(), ExtractorError> {
        self.downloads.borrow_mut().push(request.clone());

        if self.failing.contains(&request.url) {
            on_progress(Progress {
                status: ProgressStatus::Error,
                percent: None,
                filename: String::new(),
            });
            return Err(ExtractorError::Failed {
                code: Some(1),
                message: format!("unable to download {}", request.url),
            });
        }

        let landed = Self::landed_path(request);
        let filename = landed.to_string_lossy().into_owned();
        for percent in [50.0, 100.0] {
            on_progress(Progress {
                status: ProgressStatus::Downloading,
                percent: Some(percent),
                filename: filename.clone(),
            });
        }
        on_progress(Progress {
            status: ProgressStatus::Finished,
            percent: Some(100.0),
            filename,
        });

        if self.create_files && !request.playlist {
            std::fs::write(&landed, b"")?;
        }
        Ok(())
    }
}

/// Terminal fed from a fixed list of answers; records everything shown
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    answers: VecDeque<String>,
    pub lines: Vec<(Tone, String)>,
    pub questions: Vec<String>,
    pub progress_updates: Vec<Progress>,
    pub finished_progress: usize,
    pub redraws: usize,
}

impl ScriptedTerminal {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn said(&self, text: &str) -> bool {
        self.lines.iter().any(|(_, line)| line == text)
    }

    pub fn said_starting_with(&self, prefix: &str) -> bool {
        self.lines.iter().any(|(_, line)| line.starts_with(prefix))
    }
}

impl Terminal for ScriptedTerminal {
    fn say(&mut self, tone: Tone, message: &str) {
        self.lines.push((tone, message.to_string()));
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }

    fn progress(&mut self, update: &Progress) {
        self.progress_updates.push(update.clone());
    }

    fn finish_progress(&mut self) {
        self.finished_progress += 1;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}
