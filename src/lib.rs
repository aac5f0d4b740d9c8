//! adb-mirror library
//!
//! Resumable mirroring of a device's storage: enumerate remote files, decide per
//! file whether the local copy can be trusted, pull what is missing, and record
//! each completed pull so an interrupted run picks up where it stopped.

pub mod adb;
pub mod cli;
pub mod config;
pub mod decision;
pub mod device;
pub mod enumerate;
pub mod logger;
pub mod mirror;
pub mod orchestrator;
pub mod progress;
pub mod progress_store;
pub mod transfer;

pub use config::{AdbConfig, AppConfig, SyncConfig, Timeouts};
pub use device::{Device, RemoteError, RemoteResult};
pub use orchestrator::{BackupOrchestrator, CancelToken, SyncPhase, SyncSummary};
