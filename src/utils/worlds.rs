//! World directory filtering

use std::fs;
use std::path::PathBuf;

/// Keep the candidates that currently exist as directories, in input order.
///
/// Missing paths and non-directories are dropped without error. Symlinks are
/// followed, so a link to a world directory counts as a world.
pub fn filter_existing<I, P>(candidates: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|path| fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false))
        .collect()
}
