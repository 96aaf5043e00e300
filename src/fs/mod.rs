// src/fs/mod.rs

//! Small async filesystem helpers shared by the installer, the stylesheet
//! engine and the cleaner.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::fs;
use tracing::debug;

use crate::errors::{PipelineError, Result};

/// Mirror `rel` under `build`, optionally swapping the extension.
///
/// `output_path("build", "css/site.scss", Some("css"))` → `build/css/site.css`.
pub fn output_path(build: &Path, rel: &Path, extension: Option<&str>) -> PathBuf {
    let mirrored = build.join(rel);
    match extension {
        Some(ext) => mirrored.with_extension(ext),
        None => mirrored,
    }
}

/// True if `path` was modified after `since`, or if there is no `since` at
/// all.
///
/// With a zero `resolution` the comparison is strict. Otherwise `since` is
/// expected to be floored with [`floor_to`] and a file stamped exactly on it
/// counts as modified: on a coarse filesystem that step also holds edits made
/// after `since` was taken.
pub async fn modified_since(
    path: &Path,
    since: Option<SystemTime>,
    resolution: Duration,
) -> Result<bool> {
    let Some(since) = since else {
        return Ok(true);
    };
    let modified = fs::metadata(path).await?.modified()?;
    Ok(if resolution.is_zero() {
        modified > since
    } else {
        modified >= since
    })
}

/// Round `at` down to a multiple of `resolution` since the Unix epoch.
pub fn floor_to(at: SystemTime, resolution: Duration) -> SystemTime {
    if resolution.is_zero() {
        return at;
    }
    let Ok(elapsed) = at.duration_since(UNIX_EPOCH) else {
        return at;
    };
    // `resolution` is validated to at most a minute, so the remainder fits.
    let excess = (elapsed.as_nanos() % resolution.as_nanos()) as u64;
    at - Duration::from_nanos(excess)
}

/// Copy `from` to `to`, creating parent directories and overwriting any
/// existing file.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    let wrap = |source| PipelineError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await.map_err(wrap)?;
    }
    fs::copy(from, to).await.map_err(wrap)
}

/// Write `contents` to `path`, creating parent directories.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    Ok(())
}

/// Remove `path` and everything below it.
///
/// - a missing path is not an error;
/// - a symlink (at the top or anywhere below) is unlinked, never followed.
pub async fn remove_tree(path: &Path) -> Result<()> {
    let wrap = |source| PipelineError::Clean {
        path: path.to_path_buf(),
        source,
    };

    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(?path, "nothing to remove");
            return Ok(());
        }
        Err(err) => return Err(wrap(err)),
    };

    let result = if meta.file_type().is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(wrap(err)),
    }
}
