//! Presentation seam between the flows and whatever draws them

use crate::extractor::Progress;
use std::io;

/// How a message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    /// Step announcements ("Starting download: ...")
    Info,
    Success,
    /// Skips and user-facing remarks
    Notice,
    Warning,
    Failure,
    /// A listed song or search result
    Entry,
    Link,
}

#[allow(async_fn_in_trait)]
pub trait Terminal {
    fn say(&mut self, tone: Tone, message: &str);

    /// Show `question` and wait for one line of input, without its newline.
    /// `Ok(None)` means input is closed.
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    fn progress(&mut self, update: &Progress);

    /// Called once a download has returned, successfully or not
    fn finish_progress(&mut self);

    /// Clear the screen and draw the banner
    fn redraw(&mut self);
}
