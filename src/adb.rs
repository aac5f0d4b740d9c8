//! `Device` implementation backed by the adb command-line tool
//!
//! Each primitive spawns one adb process and waits for it under a deadline.
//! The wait runs on a private current-thread tokio runtime so that a command
//! which overruns can be killed; callers still see a plain blocking call.

use crate::config::{AdbConfig, Timeouts};
use crate::device::{Device, RemoteError, RemoteResult};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Runtime;
use tokio::time::timeout;

pub struct AdbDevice {
    adb: PathBuf,
    serial: Option<String>,
    timeouts: Timeouts,
    runtime: Runtime,
}

impl AdbDevice {
    pub fn new(config: &AdbConfig, timeouts: Timeouts) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build tokio runtime for adb")?;
        Ok(Self {
            adb: config.adb_path.clone(),
            serial: config.serial.clone(),
            timeouts,
            runtime,
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run `cmd` to completion or kill it at `limit`; stdout on success
    fn run(&self, op: &'static str, mut cmd: Command, limit: Duration) -> RemoteResult<String> {
        self.runtime.block_on(async move {
            match timeout(limit, cmd.output()).await {
                Err(_) => Err(RemoteError::Timeout { op, after: limit }),
                Ok(Err(e)) => Err(RemoteError::Connection(format!(
                    "failed to run {}: {e}",
                    self.adb.display()
                ))),
                Ok(Ok(out)) if out.status.success() => {
                    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
                }
                Ok(Ok(out)) => {
                    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                    if is_missing_file(&stderr) {
                        Err(RemoteError::NotFound(stderr))
                    } else {
                        Err(RemoteError::Command {
                            op,
                            status: out.status.code().unwrap_or(-1),
                            stderr,
                        })
                    }
                }
            }
        })
    }

    fn shell(&self, op: &'static str, script: String, limit: Duration) -> RemoteResult<String> {
        let mut cmd = self.command();
        cmd.arg("shell").arg(script);
        self.run(op, cmd, limit)
    }
}

impl Device for AdbDevice {
    fn is_connected(&self) -> bool {
        let mut cmd = self.command();
        cmd.arg("devices");
        match self.run("devices", cmd, self.timeouts.connect()) {
            Ok(out) => has_ready_device(&out, self.serial.as_deref()),
            Err(_) => false,
        }
    }

    fn list_files(&self, root: &str) -> RemoteResult<Vec<String>> {
        let script = format!("find {} -type f 2>/dev/null | sort", shell_quote(root));
        let out = self.shell("list", script, self.timeouts.list())?;
        Ok(parse_listing(&out))
    }

    fn stat_size(&self, path: &str) -> RemoteResult<u64> {
        let script = format!("stat -c %s {}", shell_quote(path));
        let out = self.shell("stat", script, self.timeouts.stat())?;
        parse_size(&out).ok_or_else(|| RemoteError::Command {
            op: "stat",
            status: 0,
            stderr: format!("unexpected stat output: {:?}", out.trim()),
        })
    }

    fn pull(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        let mut cmd = self.command();
        cmd.arg("pull").arg(remote).arg(local);
        self.run("pull", cmd, self.timeouts.pull()).map(|_| ())
    }
}

/// Whether `adb devices` output shows a device in the `device` state
/// (optionally the one with `serial`)
pub fn has_ready_device(output: &str, serial: Option<&str>) -> bool {
    output
        .lines()
        .skip_while(|l| !l.starts_with("List of devices"))
        .skip(1)
        .filter_map(|l| {
            let mut cols = l.split_whitespace();
            Some((cols.next()?, cols.next()?))
        })
        .any(|(id, state)| state == "device" && serial.map_or(true, |s| s == id))
}

pub fn parse_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_size(output: &str) -> Option<u64> {
    let s = output.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Single-quote `s` for the device shell
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn is_missing_file(stderr: &str) -> bool {
    stderr.contains("No such file") || stderr.contains("does not exist")
}
