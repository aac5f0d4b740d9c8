//! Console presentation: a single-line bar while pulling and the final summary

use crate::orchestrator::{ProgressSink, SyncSummary};
use crossterm::style::{Color, Stylize};
use indicatif::{ProgressBar, ProgressStyle};

pub struct BackupProgress {
    bar: ProgressBar,
}

impl BackupProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:50}] {pos}/{len} files ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Default for BackupProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BackupProgress {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, processed: usize, _total: usize) {
        self.bar.set_position(processed as u64);
    }
}

pub fn print_summary(summary: &SyncSummary) {
    println!();
    if summary.interrupted {
        println!("{}", "Backup interrupted by user.".with(Color::Yellow).bold());
    } else if summary.connection_lost {
        println!("{}", "Device connection lost during backup.".with(Color::Red).bold());
    }
    println!("{}", "Backup process completed.".with(Color::Green).bold());
    println!("Total files: {}", summary.total);
    println!("Successfully backed up: {}", summary.succeeded);
    println!("Skipped (already backed up): {}", summary.skipped);
    println!("Failed: {}", summary.failed);
}
