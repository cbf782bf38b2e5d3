//! Zip archive construction for world directories
//!
//! The container is streamed to `<destination>.partial` and renamed onto
//! `<destination>` only after the central directory is written and the file
//! is synced. A failed build leaves the `.partial` file behind untouched.

use super::walker::{normalize, EntryKind, WalkEntry, Walker};
use crate::error::{BackupError, Result};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Transfer buffer used for every file copied into the archive
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Suffix of the in-progress container next to the final archive
pub const STAGING_SUFFIX: &str = ".partial";

/// Nodes with this exact name are never archived
pub const LOCK_FILE_NAME: &str = "session.lock";

/// Nodes with this suffix are never archived
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Counters for a finished archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub directories: usize,
    pub files: usize,
    pub excluded: usize,
    /// Entries skipped because an earlier world already wrote that name
    pub duplicates: usize,
    /// Uncompressed payload bytes copied
    pub bytes: u64,
}

impl std::fmt::Display for ArchiveSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} directories, {} bytes ({} excluded",
            self.files, self.directories, self.bytes, self.excluded
        )?;
        if self.duplicates > 0 {
            write!(f, ", {} duplicate", self.duplicates)?;
        }
        f.write_str(")")
    }
}

/// Whether a node's own archive entry is suppressed.
///
/// Only the node itself is affected: an excluded directory is still walked
/// and its children are archived under their full paths.
pub fn is_excluded(file_name: &str) -> bool {
    file_name == LOCK_FILE_NAME || file_name.ends_with(TEMP_FILE_SUFFIX)
}

/// Path of the in-progress container for `destination`
pub fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// Archive every world tree into a new zip at `destination`.
///
/// Worlds are processed in the given order; a world that disappeared since
/// it was filtered is skipped. Any I/O or zip failure aborts the whole build.
pub fn build(destination: &Path, worlds: &[PathBuf]) -> Result<ArchiveSummary> {
    let staging = staging_path(destination);
    let fail = |path: &Path, source: zip::result::ZipError| {
        BackupError::archive(destination, path, source)
    };

    let file = File::create(&staging).map_err(|e| fail(&staging, e.into()))?;
    let mut zip = ZipWriter::new(file);
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut summary = ArchiveSummary::default();
    let mut written = HashSet::new();

    for world in worlds {
        if !world.exists() {
            continue;
        }

        for item in Walker::new(world) {
            let entry = item.map_err(|e| fail(&e.path, e.source.into()))?;

            if is_excluded(&entry.file_name()) {
                summary.excluded += 1;
                continue;
            }

            // Links are only followed once they are known to be kept
            let path = entry.path.clone();
            let entry = match entry.resolve().map_err(|e| fail(&path, e.into()))? {
                Some(entry) => entry,
                None => continue,
            };

            let name = normalize(&entry.path);
            if name.is_empty() {
                continue;
            }
            let name = match entry.kind {
                EntryKind::Directory => format!("{}/", name),
                _ => name,
            };
            // Repeated or nested worlds reach the same names
            if !written.insert(name.clone()) {
                summary.duplicates += 1;
                continue;
            }

            match entry.kind {
                EntryKind::Directory => {
                    zip.add_directory(name, directory_options(&entry))
                        .map_err(|e| fail(&entry.path, e))?;
                    summary.directories += 1;
                }
                // Resolved above
                EntryKind::Symlink => {}
                EntryKind::File => {
                    zip.start_file(name, file_options(&entry))
                        .map_err(|e| fail(&entry.path, e))?;
                    let mut source =
                        File::open(&entry.path).map_err(|e| fail(&entry.path, e.into()))?;
                    let copied = copy_buffered(&mut source, &mut zip, &mut buffer)
                        .map_err(|e| fail(&entry.path, e.into()))?;
                    summary.files += 1;
                    summary.bytes += copied;
                }
            }
        }
    }

    let file = zip.finish().map_err(|e| fail(&staging, e))?;
    file.sync_all().map_err(|e| fail(&staging, e.into()))?;
    drop(file);

    fs::rename(&staging, destination).map_err(|e| fail(destination, e.into()))?;

    Ok(summary)
}

/// Copy `reader` into `writer` through `buffer`, returning bytes copied
fn copy_buffered<R: Read, W: Write>(reader: &mut R, writer: &mut W, buffer: &mut [u8]) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match reader.read(buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        total += n as u64;
    }
}

fn directory_options(entry: &WalkEntry) -> SimpleFileOptions {
    with_metadata(
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        entry,
    )
}

fn file_options(entry: &WalkEntry) -> SimpleFileOptions {
    with_metadata(
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(entry.size >= u64::from(u32::MAX)),
        entry,
    )
}

fn with_metadata(mut options: SimpleFileOptions, entry: &WalkEntry) -> SimpleFileOptions {
    if let Some(stamp) = entry.modified.and_then(zip_timestamp) {
        options = options.last_modified_time(stamp);
    }
    if let Some(mode) = entry.mode {
        options = options.unix_permissions(mode);
    }
    options
}

/// Zip timestamps are local wall-clock time, 1980..=2107
fn zip_timestamp(time: std::time::SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    let year = u16::try_from(local.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}
