//! Skip / fetch / repair decision for a single remote file
//!
//! A file is trusted only when it has a progress record, exists locally, and its
//! local size equals the live remote size. This is a size-equality heuristic:
//! two different files of identical length are indistinguishable, and no content
//! hashing is done to tell them apart.

use crate::device::{Device, RemoteError};
use crate::logger::Logger;
use crate::progress_store::ProgressMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Local copy is recorded and matches the remote size
    Skip,
    /// No record or no local copy yet
    Fetch,
    /// Local copy was stale or unverifiable and has been deleted
    Repair,
}

impl Decision {
    pub fn needs_backup(self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

pub fn decide(
    device: &dyn Device,
    remote: &str,
    local: &Path,
    progress: &ProgressMap,
    logger: &dyn Logger,
) -> Decision {
    if !progress.contains_key(remote) || !local.exists() {
        return Decision::Fetch;
    }

    let local_size = match fs::metadata(local) {
        Ok(meta) => meta.len(),
        Err(e) => {
            logger.error("check", remote, &format!("cannot stat local copy: {e}"));
            return Decision::Fetch;
        }
    };

    let reason = match device.stat_size(remote) {
        Ok(remote_size) if remote_size == local_size => return Decision::Skip,
        Ok(remote_size) => {
            logger.info(&format!(
                "File size mismatch for {remote}. Local: {local_size}, Device: {remote_size}"
            ));
            "size mismatch"
        }
        Err(RemoteError::NotFound(_)) => {
            logger.error("stat", remote, "file vanished from device");
            "remote size unavailable"
        }
        Err(e) => {
            logger.error("stat", remote, &e.to_string());
            "remote size unavailable"
        }
    };

    match fs::remove_file(local) {
        Ok(()) => logger.removed(local, reason),
        Err(e) => logger.error("remove", &local.display().to_string(), &e.to_string()),
    }
    Decision::Repair
}

/// Boolean view of [`decide`]
pub fn needs_backup(
    device: &dyn Device,
    remote: &str,
    local: &Path,
    progress: &ProgressMap,
    logger: &dyn Logger,
) -> bool {
    decide(device, remote, local, progress, logger).needs_backup()
}
