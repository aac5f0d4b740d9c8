use crate::device::{Device, RemoteError};
use crate::logger::Logger;
use std::fs;
use std::path::Path;

/// Result of a single pull attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Pulled,
    Failed,
    /// Deadline exceeded; any partial local file has been removed
    TimedOut,
}

impl PullOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, PullOutcome::Pulled)
    }
}

/// Pull one remote file into `local`. Never retries.
///
/// Success requires both a clean result from the device and a local file
/// afterwards. Only existence is checked, not content.
pub fn pull_file(
    device: &dyn Device,
    remote: &str,
    local: &Path,
    logger: &dyn Logger,
) -> PullOutcome {
    logger.info(&format!("Pulling file: {remote}"));

    match device.pull(remote, local) {
        Ok(()) if local.is_file() => PullOutcome::Pulled,
        Ok(()) => {
            logger.error(
                "pull",
                remote,
                &format!(
                    "pull reported success but {} doesn't exist",
                    local.display()
                ),
            );
            PullOutcome::Failed
        }
        Err(e @ RemoteError::Timeout { .. }) => {
            logger.error("pull", remote, &e.to_string());
            remove_partial(local, logger);
            PullOutcome::TimedOut
        }
        Err(e) => {
            logger.error("pull", remote, &e.to_string());
            PullOutcome::Failed
        }
    }
}

// Best effort: a failed removal is not reported further.
fn remove_partial(local: &Path, logger: &dyn Logger) {
    if local.exists() && fs::remove_file(local).is_ok() {
        logger.removed(local, "partial file after timeout");
    }
}
