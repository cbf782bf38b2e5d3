//! Depth-first directory traversal
//!
//! [`Walker`] yields one [`WalkEntry`] per visited node, parents before their
//! children, children in the order the filesystem enumerates them. It is lazy
//! (one `ReadDir` handle open per level of depth) and stops for good after the
//! first error.

use std::fs::{self, Metadata, ReadDir};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Link below the root, not yet resolved (see [`WalkEntry::resolve`])
    Symlink,
}

/// One visited filesystem node
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Path as walked: the root as given, joined with child names
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Length in bytes (0 for directories)
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Unix permission bits, when the platform has them
    pub mode: Option<u32>,
}

impl WalkEntry {
    /// Final path component, or the whole path when it has none (e.g. `..`)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Follow a [`EntryKind::Symlink`] entry to what it points at.
    ///
    /// Other kinds are returned unchanged. `Ok(None)` means the target is
    /// neither a file nor a directory. Resolved directories are never walked.
    pub fn resolve(self) -> std::io::Result<Option<WalkEntry>> {
        if self.kind != EntryKind::Symlink {
            return Ok(Some(self));
        }

        let metadata = fs::metadata(&self.path)?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            return Ok(None);
        };
        Ok(Some(Self::from_metadata(self.path, kind, &metadata)))
    }

    fn from_metadata(path: PathBuf, kind: EntryKind, metadata: &Metadata) -> Self {
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };
        #[cfg(not(unix))]
        let mode = None;

        Self {
            size: if kind == EntryKind::File { metadata.len() } else { 0 },
            modified: metadata.modified().ok(),
            path,
            kind,
            mode,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to walk {path:?}: {source}")]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub struct Walker {
    pending_root: Option<PathBuf>,
    stack: Vec<(PathBuf, ReadDir)>,
    finished: bool,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            pending_root: Some(root.into()),
            stack: Vec::new(),
            finished: false,
        }
    }

    fn fail(&mut self, path: &Path, source: std::io::Error) -> Option<Result<WalkEntry, WalkError>> {
        self.finished = true;
        self.stack.clear();
        Some(Err(WalkError {
            path: path.to_path_buf(),
            source,
        }))
    }

    /// Stat `path` and open it for descent when it is a real directory.
    /// Returns `None` for nodes that are neither files nor directories.
    ///
    /// The root is always resolved, so a symlinked root is walked.
    fn visit(&mut self, path: PathBuf, is_root: bool) -> Option<Result<WalkEntry, WalkError>> {
        let stat = if is_root {
            fs::metadata(&path)
        } else {
            fs::symlink_metadata(&path)
        };
        let link_meta = match stat {
            Ok(m) => m,
            Err(e) => return self.fail(&path, e),
        };

        if link_meta.is_dir() {
            let children = match fs::read_dir(&path) {
                Ok(rd) => rd,
                Err(e) => return self.fail(&path, e),
            };
            let entry = WalkEntry::from_metadata(path.clone(), EntryKind::Directory, &link_meta);
            self.stack.push((path, children));
            return Some(Ok(entry));
        }

        // Symlinks are reported as-is and never descended into
        let file_type = link_meta.file_type();
        if file_type.is_symlink() {
            Some(Ok(WalkEntry::from_metadata(path, EntryKind::Symlink, &link_meta)))
        } else if file_type.is_file() {
            Some(Ok(WalkEntry::from_metadata(path, EntryKind::File, &link_meta)))
        } else {
            None
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let (path, is_root) = if let Some(root) = self.pending_root.take() {
                (root, true)
            } else {
                let (dir, children) = match self.stack.last_mut() {
                    Some(top) => top,
                    None => {
                        self.finished = true;
                        return None;
                    }
                };
                match children.next() {
                    Some(Ok(child)) => (child.path(), false),
                    Some(Err(e)) => {
                        let dir = dir.clone();
                        return self.fail(&dir, e);
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                }
            };

            if let Some(item) = self.visit(path, is_root) {
                return Some(item);
            }
        }
    }
}

impl FusedIterator for Walker {}

/// Archive-style name for a walked path: forward slashes, no root or
/// drive prefix, no `.` components.
pub fn normalize(path: &Path) -> String {
    use std::path::Component;

    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
