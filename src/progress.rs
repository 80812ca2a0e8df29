//! Terminal progress display.
//!
//! Long waits (daemon warm-up, stop polling, downloads) report through the
//! [`ProgressReporter`] trait. The terminal implementation animates a small
//! indicator on stderr; tests and the server front-end use [`SilentProgress`].

use std::io::{self, Write};

const BAR_FRAMES: [&str; 11] = [
    ">     ", "=>    ", "==>   ", "===>  ", "====> ", "=====>", " =====", "  ====", "   ===",
    "    ==", "     =",
];

const CIRCULAR_FRAMES: [&str; 4] = ["◷", "◶", "◵", "◴"];

/// Animation style of a [`ProgressIndicator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorStyle {
    Bar,
    Circular,
}

/// Cycling text animation
#[derive(Debug, Clone)]
pub struct ProgressIndicator {
    style: IndicatorStyle,
    position: usize,
}

impl ProgressIndicator {
    pub fn new(style: IndicatorStyle) -> Self {
        Self { style, position: 0 }
    }

    fn frames(&self) -> &'static [&'static str] {
        match self.style {
            IndicatorStyle::Bar => &BAR_FRAMES,
            IndicatorStyle::Circular => &CIRCULAR_FRAMES,
        }
    }

    /// Return the current frame and advance, wrapping at the end
    pub fn next_frame(&mut self) -> &'static str {
        let frames = self.frames();
        let frame = frames[self.position % frames.len()];
        self.position = (self.position + 1) % frames.len();
        frame
    }
}

/// Sink for "still waiting" notifications
pub trait ProgressReporter: Send {
    /// Report that attempt `attempt` of `max_attempts` is pending
    fn waiting(&mut self, message: &str, attempt: u32, max_attempts: u32);

    /// The wait is over; clear or terminate the progress line
    fn finish(&mut self);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn waiting(&mut self, _message: &str, _attempt: u32, _max_attempts: u32) {}

    fn finish(&mut self) {}
}

/// Reporter that redraws a single status line on a terminal
pub struct TerminalProgress<W: Write + Send> {
    out: W,
    indicator: ProgressIndicator,
    active: bool,
}

impl TerminalProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indicator: ProgressIndicator::new(IndicatorStyle::Bar),
            active: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressReporter for TerminalProgress<W> {
    fn waiting(&mut self, message: &str, attempt: u32, max_attempts: u32) {
        let frame = self.indicator.next_frame();
        // Progress output is best effort
        let _ = write!(self.out, "\r{} {} {}/{}", frame, message, attempt, max_attempts);
        let _ = self.out.flush();
        self.active = true;
    }

    fn finish(&mut self) {
        if self.active {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_frames_wrap() {
        let mut indicator = ProgressIndicator::new(IndicatorStyle::Bar);
        let first = indicator.next_frame();
        for _ in 1..BAR_FRAMES.len() {
            indicator.next_frame();
        }
        assert_eq!(indicator.next_frame(), first);
    }

    #[test]
    fn test_circular_frames() {
        let mut indicator = ProgressIndicator::new(IndicatorStyle::Circular);
        let frames: Vec<_> = (0..5).map(|_| indicator.next_frame()).collect();
        assert_eq!(frames, vec!["◷", "◶", "◵", "◴", "◷"]);
    }

    #[test]
    fn test_terminal_progress_output() {
        let mut progress = TerminalProgress::new(Vec::new());
        progress.waiting("Waiting for divid", 1, 30);
        progress.waiting("Waiting for divid", 2, 30);
        progress.finish();
        progress.finish();

        let written = String::from_utf8(progress.into_inner()).unwrap();
        assert!(written.starts_with("\r>      Waiting for divid 1/30"));
        assert!(written.contains("\r=>     Waiting for divid 2/30"));
        assert_eq!(written.matches('\n').count(), 1);
    }
}
