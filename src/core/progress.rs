//! Progress reporting for stack transformation.
//!
//! Reporting is advisory: nothing here may influence control flow.

use indicatif::{ProgressBar, ProgressStyle};

/// Receives a total unit count up front and incremental advances.
pub trait ProgressReporter {
    fn start(&mut self, total: u64, message: &str);
    fn advance(&mut self, units: u64);
    fn finish(&mut self);
}

/// Reporter that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&mut self, _total: u64, _message: &str) {}

    fn advance(&mut self, _units: u64) {}

    fn finish(&mut self) {}
}

/// Terminal progress bar.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for TerminalProgress {
    fn start(&mut self, total: u64, message: &str) {
        let bar = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message(message.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self, units: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(units);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

/// Records every call; used to assert progress accounting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingProgress {
    pub total: Option<u64>,
    pub advances: Vec<u64>,
    pub finished: bool,
}

impl RecordingProgress {
    pub fn advanced(&self) -> u64 {
        self.advances.iter().sum()
    }
}

impl ProgressReporter for RecordingProgress {
    fn start(&mut self, total: u64, _message: &str) {
        self.total = Some(total);
    }

    fn advance(&mut self, units: u64) {
        self.advances.push(units);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
