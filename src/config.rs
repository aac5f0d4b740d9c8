//! Backup configuration
//!
//! Defaults reproduce the fixed layout of the classic backup script: `/sdcard/`
//! mirrored into `android_backup/`, with `progress.json`, `file_list.txt` and
//! `backup.log` in the working directory. Everything can be overridden from a
//! TOML file and then from the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REMOTE_ROOT: &str = "/sdcard/";
pub const DEFAULT_LOCAL_ROOT: &str = "android_backup";
pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";
pub const DEFAULT_LIST_FILE: &str = "file_list.txt";
pub const DEFAULT_LOG_FILE: &str = "backup.log";
pub const DEFAULT_CHECK_INTERVAL: usize = 10;

/// Per-primitive deadlines, in seconds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timeouts {
    pub connect: u64,
    pub list: u64,
    pub stat: u64,
    pub pull: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: 5,
            list: 60,
            stat: 5,
            pull: 300,
        }
    }
}

impl Timeouts {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }
    pub fn list(&self) -> Duration {
        Duration::from_secs(self.list)
    }
    pub fn stat(&self) -> Duration {
        Duration::from_secs(self.stat)
    }
    pub fn pull(&self) -> Duration {
        Duration::from_secs(self.pull)
    }
}

/// Everything the orchestrator needs to run one backup pass
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    pub remote_root: String,
    pub local_root: PathBuf,
    pub progress_path: PathBuf,
    /// Where the raw remote listing is written for inspection
    pub list_path: PathBuf,
    /// Files processed between connection re-checks (0 disables the check)
    pub connection_check_interval: usize,
    pub timeouts: Timeouts,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            local_root: PathBuf::from(DEFAULT_LOCAL_ROOT),
            progress_path: PathBuf::from(DEFAULT_PROGRESS_FILE),
            list_path: PathBuf::from(DEFAULT_LIST_FILE),
            connection_check_interval: DEFAULT_CHECK_INTERVAL,
            timeouts: Timeouts::default(),
        }
    }
}

/// How to reach the device through the adb binary
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdbConfig {
    pub adb_path: PathBuf,
    /// Target a specific device (`adb -s <serial>`) when several are attached
    pub serial: Option<String>,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from("adb"),
            serial: None,
        }
    }
}

/// Top-level configuration file layout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub log_file: PathBuf,
    pub sync: SyncConfig,
    pub adb: AdbConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            sync: SyncConfig::default(),
            adb: AdbConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&data)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
