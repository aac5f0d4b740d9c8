//! Command-line surface

use crate::config::{load_config, AppConfig};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Incrementally mirror an Android device's storage over adb, resuming where the last run stopped"
)]
pub struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Remote directory to mirror (default: /sdcard/)
    #[arg(long)]
    pub remote_root: Option<String>,

    /// Local mirror directory (default: android_backup)
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    /// Progress snapshot path (default: progress.json)
    #[arg(long = "progress-file")]
    pub progress_file: Option<PathBuf>,

    /// Where to write the raw remote listing (default: file_list.txt)
    #[arg(long = "list-file")]
    pub list_file: Option<PathBuf>,

    /// Log file (default: backup.log)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Device serial, for when several devices are attached
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Path to the adb executable
    #[arg(long)]
    pub adb: Option<PathBuf>,

    /// Re-check the device connection every N files (0 = never)
    #[arg(long)]
    pub check_interval: Option<usize>,

    /// Timeout for `adb devices`, in seconds
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Timeout for the remote listing, in seconds
    #[arg(long)]
    pub list_timeout: Option<u64>,

    /// Timeout for each remote size query, in seconds
    #[arg(long)]
    pub stat_timeout: Option<u64>,

    /// Timeout for each pull, in seconds
    #[arg(long)]
    pub pull_timeout: Option<u64>,

    /// Echo log lines to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        let sync = &mut cfg.sync;
        if let Some(v) = &self.remote_root {
            sync.remote_root = v.clone();
        }
        if let Some(v) = &self.local_root {
            sync.local_root = v.clone();
        }
        if let Some(v) = &self.progress_file {
            sync.progress_path = v.clone();
        }
        if let Some(v) = &self.list_file {
            sync.list_path = v.clone();
        }
        if let Some(v) = self.check_interval {
            sync.connection_check_interval = v;
        }
        if let Some(v) = self.connect_timeout {
            sync.timeouts.connect = v;
        }
        if let Some(v) = self.list_timeout {
            sync.timeouts.list = v;
        }
        if let Some(v) = self.stat_timeout {
            sync.timeouts.stat = v;
        }
        if let Some(v) = self.pull_timeout {
            sync.timeouts.pull = v;
        }

        if let Some(v) = &self.log_file {
            cfg.log_file = v.clone();
        }
        if let Some(v) = &self.serial {
            cfg.adb.serial = Some(v.clone());
        }
        if let Some(v) = &self.adb {
            cfg.adb.adb_path = v.clone();
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REMOTE_ROOT;

    #[test]
    fn defaults_without_flags() {
        let args = Args::try_parse_from(["adb-mirror"]).unwrap();
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.sync.remote_root, DEFAULT_REMOTE_ROOT);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.toml");
        std::fs::write(
            &path,
            "[sync]\nremote_root = \"/sdcard/DCIM\"\nconnection_check_interval = 50\n[adb]\nserial = \"abc\"\n",
        )
        .unwrap();
        let config_arg = path.to_string_lossy().into_owned();

        let args = Args::try_parse_from([
            "adb-mirror",
            "--config",
            config_arg.as_str(),
            "--check-interval",
            "5",
            "--pull-timeout",
            "30",
            "-s",
            "emulator-5554",
        ])
        .unwrap();
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.sync.remote_root, "/sdcard/DCIM");
        assert_eq!(cfg.sync.connection_check_interval, 5);
        assert_eq!(cfg.sync.timeouts.pull, 30);
        assert_eq!(cfg.sync.timeouts.stat, 5);
        assert_eq!(cfg.adb.serial.as_deref(), Some("emulator-5554"));
    }
}
