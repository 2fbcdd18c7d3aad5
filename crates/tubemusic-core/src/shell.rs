//! Interactive menu loop

use crate::console::{Terminal, Tone};
use crate::extractor::Extractor;
use crate::orchestrator::{resolve_destination, Orchestrator};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MENU: [&str; 5] = [
    "1. Download music by music URL",
    "2. Download playlist (auto full)",
    "3. Download playlist (manually choose)",
    "4. Search and download",
    "5. Exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Single,
    PlaylistAuto,
    PlaylistManual,
    Search,
}

impl Operation {
    fn target_question(&self) -> &'static str {
        match self {
            Operation::Single => "Enter music URL: ",
            Operation::PlaylistAuto | Operation::PlaylistManual => "Enter playlist URL: ",
            Operation::Search => "Enter search query: ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Operation),
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Run(Operation::Single)),
            "2" => Some(MenuChoice::Run(Operation::PlaylistAuto)),
            "3" => Some(MenuChoice::Run(Operation::PlaylistManual)),
            "4" => Some(MenuChoice::Run(Operation::Search)),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Where the shell stands after handling one menu answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Menu,
    Exit,
}

pub struct Shell<E, T> {
    orchestrator: Orchestrator<E>,
    terminal: T,
    default_dir: PathBuf,
}

impl<E: Extractor, T: Terminal> Shell<E, T> {
    pub fn new(orchestrator: Orchestrator<E>, terminal: T, default_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            terminal,
            default_dir,
        }
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn orchestrator(&self) -> &Orchestrator<E> {
        &self.orchestrator
    }

    /// Loop until the user exits, input closes or `interrupt` fires at the
    /// menu. An `interrupt` firing during an operation cancels only that
    /// operation.
    pub async fn run<F, Fut>(&mut self, mut interrupt: F) -> io::Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        loop {
            self.draw_menu();

            let answer = tokio::select! {
                biased;
                _ = interrupt() => None,
                answer = self.terminal.ask("Select an option (1-5): ") => answer?,
            };
            let Some(answer) = answer else {
                self.terminal.say(Tone::Plain, "");
                self.terminal.say(Tone::Success, "Exiting TubeMusic.");
                return Ok(());
            };

            if self.step(&answer, &mut interrupt).await? == State::Exit {
                return Ok(());
            }
        }
    }

    /// Handle one menu answer: run the chosen operation, then wait for the
    /// user to acknowledge before the menu comes back.
    pub async fn step<F, Fut>(&mut self, answer: &str, interrupt: &mut F) -> io::Result<State>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let operation = match MenuChoice::parse(answer) {
            Some(MenuChoice::Exit) => {
                self.terminal
                    .say(Tone::Success, "Thank you for using TubeMusic! Exiting...");
                return Ok(State::Exit);
            }
            Some(MenuChoice::Run(operation)) => operation,
            None => {
                debug!("Rejected menu answer: {:?}", answer);
                self.terminal
                    .say(Tone::Failure, "Invalid option. Please select 1-5.");
                return self.pause(interrupt).await;
            }
        };

        info!("Running {:?}", operation);
        let cancelled = tokio::select! {
            biased;
            _ = interrupt() => true,
            result = self.operate(operation) => {
                if let Err(e) = result {
                    self.terminal.say(Tone::Failure, &format!("Error: {}", e));
                }
                false
            }
        };
        if cancelled {
            info!("{:?} cancelled by user", operation);
            self.terminal.say(Tone::Plain, "");
            self.terminal.say(Tone::Failure, "Operation cancelled by user.");
        }

        self.pause(interrupt).await
    }

    async fn operate(&mut self, operation: Operation) -> io::Result<()> {
        let Some(answer) = self
            .terminal
            .ask("Enter save directory (press Enter for current directory): ")
            .await?
        else {
            return Ok(());
        };
        let dest = resolve_destination(&answer, &self.default_dir);
        tokio::fs::create_dir_all(&dest).await?;

        let Some(target) = self.terminal.ask(operation.target_question()).await? else {
            return Ok(());
        };
        let target = target.trim();
        if target.is_empty() {
            return Ok(());
        }

        self.dispatch(operation, target, &dest).await;
        Ok(())
    }

    async fn dispatch(&mut self, operation: Operation, target: &str, dest: &Path) {
        let term = &mut self.terminal;
        match operation {
            Operation::Single => self.orchestrator.single(term, target, dest).await,
            Operation::PlaylistAuto => self.orchestrator.playlist_auto(term, target, dest).await,
            Operation::PlaylistManual => {
                self.orchestrator.playlist_manual(term, target, dest).await
            }
            Operation::Search => self.orchestrator.search(term, target, dest).await,
        }
    }

    async fn pause<F, Fut>(&mut self, interrupt: &mut F) -> io::Result<State>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let answer = tokio::select! {
            biased;
            _ = interrupt() => None,
            answer = self.terminal.ask("Press Enter to continue...") => answer?,
        };
        match answer {
            Some(_) => Ok(State::Menu),
            None => {
                self.terminal.say(Tone::Plain, "");
                self.terminal.say(Tone::Success, "Exiting TubeMusic.");
                Ok(State::Exit)
            }
        }
    }

    fn draw_menu(&mut self) {
        self.terminal.redraw();
        self.terminal.say(Tone::Entry, "Options:");
        for line in MENU {
            self.terminal.say(Tone::Plain, line);
        }
    }
}
