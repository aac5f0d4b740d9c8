use crate::device::Device;
use crate::logger::Logger;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// List every regular file under `root` on the device.
///
/// Any failure (no connection, listing error, timeout) is logged and yields an
/// empty list; nothing is retried. On success the raw listing is also written to
/// `list_path`, one path per line.
pub fn enumerate_remote(
    device: &dyn Device,
    root: &str,
    list_path: &Path,
    logger: &dyn Logger,
) -> Vec<String> {
    if !device.is_connected() {
        logger.error("list", root, "no device connected");
        return Vec::new();
    }

    logger.info(&format!("Listing all files from {root}"));
    let files = match device.list_files(root) {
        Ok(files) => files,
        Err(e) => {
            logger.error("list", root, &e.to_string());
            return Vec::new();
        }
    };

    if let Err(e) = write_listing(list_path, &files) {
        logger.error("list", &list_path.display().to_string(), &format!("{e:#}"));
    }

    logger.info(&format!("Found {} files on device", files.len()));
    files
}

fn write_listing(path: &Path, files: &[String]) -> Result<()> {
    let file = File::create(path).context("Failed to create file list")?;
    let mut writer = BufWriter::new(file);
    for f in files {
        writeln!(writer, "{f}")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::FakeDevice;
    use crate::logger::{MemoryLogger, NoopLogger};

    #[test]
    fn writes_listing_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("file_list.txt");
        let device = FakeDevice::with_files(&[("/sdcard/b", b"2"), ("/sdcard/a", b"1")]);

        let files = enumerate_remote(&device, "/sdcard/", &list, &NoopLogger);
        assert_eq!(files, vec!["/sdcard/a", "/sdcard/b"]);
        assert_eq!(
            std::fs::read_to_string(&list).unwrap(),
            "/sdcard/a\n/sdcard/b\n"
        );
    }

    #[test]
    fn disconnected_device_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let device = FakeDevice::with_files(&[("/sdcard/a", b"1")]);
        device.connected.set(false);
        let logger = MemoryLogger::default();

        let files = enumerate_remote(&device, "/sdcard/", &tmp.path().join("l.txt"), &logger);
        assert!(files.is_empty());
        assert!(logger.contains("no device connected"));
        assert!(!tmp.path().join("l.txt").exists());
    }

    #[test]
    fn listing_error_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut device = FakeDevice::with_files(&[("/sdcard/a", b"1")]);
        device.list_error = true;
        let files = enumerate_remote(&device, "/sdcard/", &tmp.path().join("l.txt"), &NoopLogger);
        assert!(files.is_empty());
    }

    #[test]
    fn unwritable_listing_still_returns_files() {
        let tmp = tempfile::tempdir().unwrap();
        let device = FakeDevice::with_files(&[("/sdcard/a", b"1")]);
        let logger = MemoryLogger::default();
        let files = enumerate_remote(
            &device,
            "/sdcard/",
            &tmp.path().join("nope/file_list.txt"),
            &logger,
        );
        assert_eq!(files.len(), 1);
        assert!(logger.contains("Failed to create file list"));
    }
}
