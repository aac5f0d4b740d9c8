//! Backup orchestration: enumerate, build the mirror, then walk every remote
//! file through decide → pull → record.
//!
//! The run is strictly sequential. Cancellation is cooperative and observed only
//! between files, so a pull in flight always finishes (or times out) first.

use crate::config::SyncConfig;
use crate::decision::{decide, Decision};
use crate::device::Device;
use crate::enumerate::enumerate_remote;
use crate::logger::Logger;
use crate::mirror::{build_mirror, ensure_local_root, local_path_for};
use crate::progress_store::{ProgressRecord, ProgressStore};
use crate::transfer::pull_file;
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared stop flag, set from a signal handler and polled once per file
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Enumerating,
    MirrorBuilding,
    Looping,
    Finished,
}

/// Final counters of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Pulls preceded by deleting a stale local copy (also counted in succeeded/failed)
    pub repaired: usize,
    pub interrupted: bool,
    pub connection_lost: bool,
}

impl SyncSummary {
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// Receives per-file progress; the console bar implements this
pub trait ProgressSink {
    fn begin(&self, _total: usize) {}
    fn advance(&self, _processed: usize, _total: usize) {}
}

pub struct NoProgress;
impl ProgressSink for NoProgress {}

pub struct BackupOrchestrator<'a> {
    device: &'a dyn Device,
    config: SyncConfig,
    logger: &'a dyn Logger,
    cancel: CancelToken,
    progress: &'a dyn ProgressSink,
    phase: SyncPhase,
}

impl<'a> BackupOrchestrator<'a> {
    pub fn new(
        device: &'a dyn Device,
        config: SyncConfig,
        logger: &'a dyn Logger,
        cancel: CancelToken,
    ) -> Self {
        Self {
            device,
            config,
            logger,
            cancel,
            progress: &NoProgress,
            phase: SyncPhase::Idle,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one backup pass.
    ///
    /// Errors only when there is no device at startup, the mirror root cannot be
    /// created, or the device lists no files. Everything else is logged, counted
    /// and reported in the summary.
    pub fn run(&mut self) -> Result<SyncSummary> {
        let start = Instant::now();
        let cfg = &self.config;
        let logger = self.logger;
        logger.start(&cfg.remote_root, &cfg.local_root);

        if !self.device.is_connected() {
            bail!("No device connected");
        }
        ensure_local_root(&cfg.local_root)?;

        self.phase = SyncPhase::Enumerating;
        let files = enumerate_remote(self.device, &cfg.remote_root, &cfg.list_path, logger);
        if files.is_empty() {
            bail!(
                "No files found under {} or error listing files",
                cfg.remote_root
            );
        }

        self.phase = SyncPhase::MirrorBuilding;
        build_mirror(&files, &cfg.remote_root, &cfg.local_root, logger);

        let store = ProgressStore::new(&cfg.progress_path);
        let mut progress = store.load(logger);

        self.phase = SyncPhase::Looping;
        let mut summary = SyncSummary {
            total: files.len(),
            ..SyncSummary::default()
        };
        logger.info(&format!("Starting backup of {} files", summary.total));
        self.progress.begin(summary.total);

        for remote in &files {
            if self.cancel.is_cancelled() {
                logger.info("Backup interrupted by user");
                summary.interrupted = true;
                break;
            }

            if due_for_check(summary.processed(), cfg.connection_check_interval)
                && !self.device.is_connected()
            {
                logger.error(
                    "connection",
                    &cfg.remote_root,
                    "device connection lost during backup",
                );
                summary.connection_lost = true;
                break;
            }

            let local = local_path_for(remote, &cfg.remote_root, &cfg.local_root);
            match decide(self.device, remote, &local, &progress, logger) {
                Decision::Skip => {
                    logger.skipped(remote);
                    summary.skipped += 1;
                    self.progress.advance(summary.processed(), summary.total);
                    continue;
                }
                Decision::Repair => summary.repaired += 1,
                Decision::Fetch => {}
            }

            if pull_file(self.device, remote, &local, logger).is_success() {
                progress.insert(remote.clone(), ProgressRecord::completed_now(&local));
                store.save(&progress, logger);
                logger.pulled(remote, &local);
                summary.succeeded += 1;
            } else {
                logger.error("backup", remote, "failed to back up");
                summary.failed += 1;
            }
            self.progress.advance(summary.processed(), summary.total);
        }

        self.phase = SyncPhase::Finished;
        logger.done(
            summary.succeeded,
            summary.skipped,
            summary.failed,
            start.elapsed().as_secs_f64(),
        );
        Ok(summary)
    }
}

/// Liveness is re-checked every `interval` files, never before the first one
fn due_for_check(processed: usize, interval: usize) -> bool {
    interval > 0 && processed > 0 && processed % interval == 0
}
