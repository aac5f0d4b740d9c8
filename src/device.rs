//! Remote device seam
//!
//! The backup core never talks to adb directly. It only needs four primitives
//! from the device: a liveness probe, a recursive file listing, a size query and
//! a single-file pull. Every primitive is blocking and bounded by its own timeout.

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure kinds reported by a [`Device`] primitive
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The bridge could not be reached or the command could not be started
    #[error("device connection error: {0}")]
    Connection(String),

    /// The command did not finish before its deadline and was killed
    #[error("{op} timed out after {}s", .after.as_secs())]
    Timeout { op: &'static str, after: Duration },

    #[error("remote path not found: {0}")]
    NotFound(String),

    /// The command ran but reported failure or produced unusable output
    #[error("{op} failed (status {status}): {stderr}")]
    Command {
        op: &'static str,
        status: i32,
        stderr: String,
    },
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Primitives exposed by the device being mirrored
pub trait Device {
    /// True when a device is attached and ready
    fn is_connected(&self) -> bool;

    /// All regular files under `root`, recursively, in the order the device sorted them
    fn list_files(&self, root: &str) -> RemoteResult<Vec<String>>;

    /// Size in bytes of a single remote file
    fn stat_size(&self, path: &str) -> RemoteResult<u64>;

    /// Copy one remote file to `local`, overwriting it
    fn pull(&self, remote: &str, local: &Path) -> RemoteResult<()>;
}

/// In-memory device used by unit tests across the crate
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Default)]
    pub struct FakeDevice {
        pub files: BTreeMap<String, Vec<u8>>,
        pub connected: Cell<bool>,
        pub list_error: bool,
        pub stat_error: bool,
        pub timeout_pulls: BTreeSet<String>,
        pub failing_pulls: BTreeSet<String>,
        pub phantom_pulls: BTreeSet<String>,
        pub pulls: RefCell<Vec<String>>,
    }

    impl FakeDevice {
        pub fn with_files(files: &[(&str, &[u8])]) -> Self {
            let device = Self {
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_vec()))
                    .collect(),
                ..Self::default()
            };
            device.connected.set(true);
            device
        }
    }

    impl Device for FakeDevice {
        fn is_connected(&self) -> bool {
            self.connected.get()
        }

        fn list_files(&self, _root: &str) -> RemoteResult<Vec<String>> {
            if self.list_error {
                return Err(RemoteError::Command {
                    op: "list",
                    status: 1,
                    stderr: "find: permission denied".into(),
                });
            }
            Ok(self.files.keys().cloned().collect())
        }

        fn stat_size(&self, path: &str) -> RemoteResult<u64> {
            if self.stat_error {
                return Err(RemoteError::Timeout {
                    op: "stat",
                    after: Duration::from_secs(5),
                });
            }
            self.files
                .get(path)
                .map(|c| c.len() as u64)
                .ok_or_else(|| RemoteError::NotFound(path.to_string()))
        }

        fn pull(&self, remote: &str, local: &Path) -> RemoteResult<()> {
            self.pulls.borrow_mut().push(remote.to_string());
            let content = self
                .files
                .get(remote)
                .ok_or_else(|| RemoteError::NotFound(remote.to_string()))?;
            if self.timeout_pulls.contains(remote) {
                std::fs::write(local, &content[..content.len() / 2])
                    .map_err(|e| RemoteError::Connection(e.to_string()))?;
                return Err(RemoteError::Timeout {
                    op: "pull",
                    after: Duration::from_secs(300),
                });
            }
            if self.failing_pulls.contains(remote) {
                return Err(RemoteError::Command {
                    op: "pull",
                    status: 1,
                    stderr: "device offline".into(),
                });
            }
            if self.phantom_pulls.contains(remote) {
                return Ok(());
            }
            std::fs::write(local, content).map_err(|e| RemoteError::Connection(e.to_string()))
        }
    }
}
