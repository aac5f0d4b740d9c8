//! Local mirror layout
//!
//! Maps remote paths onto the local tree and pre-creates the directories the
//! pulls will land in.

use crate::logger::Logger;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Local destination for `remote`: the path relative to `remote_root`, reparented
/// under `local_root`. Paths outside the root keep their full device path.
/// Only normal components survive, so `..` in a listing cannot escape the mirror.
pub fn local_path_for(remote: &str, remote_root: &str, local_root: &Path) -> PathBuf {
    let remote_path = Path::new(remote);
    let rel = match remote_path.strip_prefix(remote_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        Ok(_) => remote_path
            .file_name()
            .map(Path::new)
            .unwrap_or(remote_path),
        Err(_) => remote_path,
    };

    let mut dst = local_root.to_path_buf();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            dst.push(part);
        }
    }
    dst
}

/// Create the mirror root itself; the run cannot proceed without it
pub fn ensure_local_root(local_root: &Path) -> Result<()> {
    fs::create_dir_all(local_root)
        .with_context(|| format!("Failed to create backup directory {}", local_root.display()))
}

/// Create every parent directory the listing needs. Failures are logged per
/// directory and skipped. Returns how many distinct directories are in place.
pub fn build_mirror(
    remote_paths: &[String],
    remote_root: &str,
    local_root: &Path,
    logger: &dyn Logger,
) -> usize {
    logger.info("Creating local directory structure");

    let dirs: BTreeSet<PathBuf> = remote_paths
        .iter()
        .filter_map(|remote| {
            local_path_for(remote, remote_root, local_root)
                .parent()
                .map(Path::to_path_buf)
        })
        .collect();

    let mut created = 0;
    for dir in &dirs {
        match fs::create_dir_all(dir) {
            Ok(()) => created += 1,
            Err(e) => logger.error("mkdir", &dir.display().to_string(), &e.to_string()),
        }
    }

    logger.info(&format!("Created {created} directories"));
    created
}
