use anyhow::Result;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Event sink for a backup run. Every hook defaults to a no-op.
pub trait Logger: Send + Sync {
    fn start(&self, _remote_root: &str, _local_root: &Path) {}
    fn info(&self, _msg: &str) {}
    fn skipped(&self, _remote: &str) {}
    fn pulled(&self, _remote: &str, _local: &Path) {}
    fn removed(&self, _local: &Path, _reason: &str) {}
    fn error(&self, _context: &str, _subject: &str, _msg: &str) {}
    fn done(&self, _succeeded: usize, _skipped: usize, _failed: usize, _seconds: f64) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

/// Appends timestamped lines to a log file, optionally echoing them to stderr
pub struct TextLogger {
    file: Mutex<File>,
    echo: bool,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P, echo: bool) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
            echo,
        })
    }

    fn line(&self, level: &str, s: &str) {
        let entry = format!("[{}] {} {}", Utc::now().to_rfc3339(), level, s);
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "{entry}");
        }
        if self.echo {
            eprintln!("{entry}");
        }
    }
}

impl Logger for TextLogger {
    fn start(&self, remote_root: &str, local_root: &Path) {
        self.line(
            "INFO",
            &format!("START remote={} local={}", remote_root, local_root.display()),
        );
    }
    fn info(&self, msg: &str) {
        self.line("INFO", msg);
    }
    fn skipped(&self, remote: &str) {
        self.line("INFO", &format!("SKIP remote={remote}"));
    }
    fn pulled(&self, remote: &str, local: &Path) {
        self.line(
            "INFO",
            &format!("PULL remote={} local={}", remote, local.display()),
        );
    }
    fn removed(&self, local: &Path, reason: &str) {
        self.line(
            "INFO",
            &format!("REMOVE path={} reason={}", local.display(), reason),
        );
    }
    fn error(&self, context: &str, subject: &str, msg: &str) {
        self.line(
            "ERROR",
            &format!("ctx={context} subject={subject} msg={msg}"),
        );
    }
    fn done(&self, succeeded: usize, skipped: usize, failed: usize, seconds: f64) {
        self.line(
            "INFO",
            &format!(
                "DONE succeeded={succeeded} skipped={skipped} failed={failed} seconds={seconds:.3}"
            ),
        );
    }
}

/// Collects lines in memory; lets tests assert on what was reported
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryLogger {
    pub lines: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemoryLogger {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .map(|l| l.iter().any(|line| line.contains(needle)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
impl Logger for MemoryLogger {
    fn info(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("INFO {msg}"));
    }
    fn removed(&self, local: &Path, reason: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("REMOVE {} {}", local.display(), reason));
    }
    fn error(&self, context: &str, subject: &str, msg: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("ERROR {context} {subject} {msg}"));
    }
}
