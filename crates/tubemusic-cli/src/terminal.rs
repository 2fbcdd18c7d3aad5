//! Colored console implementation of the core `Terminal`

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;
use tubemusic_core::console::{Terminal, Tone};
use tubemusic_core::extractor::{Progress, ProgressStatus};

const BANNER: &str = r"
  _____      _          __  __           _
 |_   _|   _| |__   ___|  \/  |_   _ ___(_) ___
   | || | | | '_ \ / _ \ |\/| | | | / __| |/ __|
   | || |_| | |_) |  __/ |  | | |_| \__ \ | (__
   |_| \__,_|_.__/ \___|_|  |_|\__,_|___/_|\___|
";

const RESET: &str = "\x1b[0m";
const PROMPT: &str = "\x1b[1;33m";

fn tone_code(tone: Tone) -> Option<&'static str> {
    match tone {
        Tone::Plain => None,
        Tone::Info => Some("\x1b[1;34m"),
        Tone::Success => Some("\x1b[1;32m"),
        Tone::Notice | Tone::Warning => Some("\x1b[1;33m"),
        Tone::Failure => Some("\x1b[1;31m"),
        Tone::Entry => Some("\x1b[1;36m"),
        Tone::Link => Some("\x1b[1;35m"),
    }
}

/// Stdout/stdin terminal. Lines are read on a dedicated thread so a pending
/// prompt can be abandoned when Ctrl-C cancels the operation around it.
pub struct ConsoleTerminal {
    lines: mpsc::UnboundedReceiver<io::Result<String>>,
    color: bool,
    bar: Option<ProgressBar>,
    current_file: String,
}

impl ConsoleTerminal {
    pub fn new() -> Self {
        Self {
            lines: spawn_stdin_reader(),
            color: io::stdout().is_terminal(),
            bar: None,
            current_file: String::new(),
        }
    }

    fn paint(&self, code: Option<&str>, text: &str) -> String {
        match code {
            Some(code) if self.color => format!("{}{}{}", code, text, RESET),
            _ => text.to_string(),
        }
    }

    fn start_bar(&mut self, filename: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }

        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_message(format!("Downloading {}", display_name(filename)));
        self.bar = Some(bar);
        self.current_file = filename.to_string();
    }

    /// Bar tracking `filename`, replacing the previous one when the file changes
    fn bar_for(&mut self, filename: &str) -> &ProgressBar {
        if self.bar.is_none() || filename != self.current_file {
            self.start_bar(filename);
        }
        self.bar.get_or_insert_with(|| ProgressBar::new(100))
    }
}

impl Terminal for ConsoleTerminal {
    fn say(&mut self, tone: Tone, message: &str) {
        let line = self.paint(tone_code(tone), message);
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        print!("{}", self.paint(Some(PROMPT), question));
        io::stdout().flush()?;

        match self.lines.recv().await {
            Some(line) => {
                let line = line?;
                Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
            }
            None => {
                println!();
                Ok(None)
            }
        }
    }

    fn progress(&mut self, update: &Progress) {
        match update.status {
            ProgressStatus::Error => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon_with_message(format!("Failed {}", display_name(&update.filename)));
                }
                self.current_file.clear();
            }
            ProgressStatus::Downloading => {
                let bar = self.bar_for(&update.filename);
                if let Some(percent) = update.percent {
                    bar.set_position(percent.round() as u64);
                }
            }
            ProgressStatus::Finished => {
                let bar = self.bar_for(&update.filename);
                bar.set_position(100);
                bar.set_message(format!("Downloaded {}", display_name(&update.filename)));
            }
        }
    }

    fn finish_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
        self.current_file.clear();
    }

    fn redraw(&mut self) {
        if self.color {
            // Clear screen, cursor home
            print!("\x1b[2J\x1b[H");
        }
        println!("{}", self.paint(Some("\x1b[1;36m"), BANNER));
        println!(
            "{}\n",
            self.paint(Some("\x1b[1;33m"), "Welcome to TubeMusic Downloader!")
        );
    }
}

fn display_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        loop {
            let mut line = String::new();
            match handle.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
        debug!("stdin closed");
    });
    rx
}
