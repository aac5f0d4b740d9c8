//! Durable record of files already pulled
//!
//! The store is a single JSON object keyed by remote path. It is rewritten in
//! full after every successful pull. A missing or unreadable snapshot is not an
//! error: the run simply starts with an empty map and every file is revalidated.
//! Records are advisory; the decision engine still compares sizes on each run.

use crate::logger::Logger;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub completed: bool,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub local_path: PathBuf,
}

impl ProgressRecord {
    pub fn completed_now(local_path: &Path) -> Self {
        Self {
            completed: true,
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            local_path: local_path.to_path_buf(),
        }
    }
}

pub type ProgressMap = BTreeMap<String, ProgressRecord>;

pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ProgressStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot; absent or malformed files yield an empty map
    pub fn load(&self, logger: &dyn Logger) -> ProgressMap {
        if !self.path.exists() {
            logger.info("No progress file found, starting fresh");
            return ProgressMap::new();
        }
        match self.read() {
            Ok(map) => {
                logger.info(&format!("Loaded progress for {} files", map.len()));
                map
            }
            Err(e) => {
                logger.error(
                    "progress",
                    &self.path.display().to_string(),
                    &format!("{e:#}; starting fresh"),
                );
                ProgressMap::new()
            }
        }
    }

    /// Overwrite the snapshot with `map`. Failures are logged and reported as `false`.
    pub fn save(&self, map: &ProgressMap, logger: &dyn Logger) -> bool {
        match self.write(map) {
            Ok(()) => true,
            Err(e) => {
                logger.error("progress", &self.path.display().to_string(), &format!("{e:#}"));
                false
            }
        }
    }

    fn read(&self) -> Result<ProgressMap> {
        let file = File::open(&self.path).context("Failed to open progress file for reading")?;
        let map = serde_json::from_reader(BufReader::new(file))
            .context("Progress file is corrupted")?;
        Ok(map)
    }

    fn write(&self, map: &ProgressMap) -> Result<()> {
        let file = File::create(&self.path).context("Failed to open progress file for writing")?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, map)?;
        writer.flush()?;
        Ok(())
    }
}
