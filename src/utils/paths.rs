//! Backup root validation

use crate::error::{BackupError, DirectoryStage, Result};
use std::fs;
use std::path::Path;

/// Name of the short-lived file used to prove the backup root is writable
pub const PROBE_FILE_NAME: &str = ".write-test";

const PROBE_CONTENT: &[u8] = b"test";

/// Make sure `root` exists and accepts writes.
///
/// Creates `root` with all missing parents, then writes and removes a probe
/// file inside it. Directories created before a later failure stay on disk.
pub fn ensure_usable(root: &Path) -> Result<()> {
    let fail = |stage, source| BackupError::Directory {
        path: root.to_path_buf(),
        stage,
        source,
    };

    fs::create_dir_all(root).map_err(|e| fail(DirectoryStage::Create, e))?;

    let probe = root.join(PROBE_FILE_NAME);
    fs::write(&probe, PROBE_CONTENT).map_err(|e| fail(DirectoryStage::ProbeWrite, e))?;
    fs::remove_file(&probe).map_err(|e| fail(DirectoryStage::ProbeRemove, e))?;

    Ok(())
}
