//! adb-mirror - incremental, resumable backup of an Android device over adb

use adb_mirror::adb::AdbDevice;
use adb_mirror::cli::Args;
use adb_mirror::logger::{Logger, NoopLogger, TextLogger};
use adb_mirror::progress::{print_summary, BackupProgress};
use adb_mirror::{BackupOrchestrator, CancelToken};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve()?;

    // Ctrl-C only requests a stop; the loop finishes the current file and reports
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("Error setting Ctrl-C handler")?;
    }

    let logger: Arc<dyn Logger> = match TextLogger::new(&config.log_file, args.verbose) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {}: {}",
                config.log_file.display(),
                e
            );
            Arc::new(NoopLogger)
        }
    };
    logger.info("Starting Android backup");

    let device = AdbDevice::new(&config.adb, config.sync.timeouts.clone())?;
    let bar = if args.verbose {
        BackupProgress::hidden()
    } else {
        BackupProgress::new()
    };

    let result = BackupOrchestrator::new(&device, config.sync, logger.as_ref(), cancel)
        .with_progress(&bar)
        .run();
    bar.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            logger.error("backup", "run", &format!("{e:#}"));
            return Err(e);
        }
    };
    print_summary(&summary);

    if summary.interrupted {
        // 128 + SIGINT
        std::process::exit(130);
    }
    Ok(())
}
