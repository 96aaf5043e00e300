// src/classify/walker.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{PipelineError, Result};

/// A regular file found under the source root.
///
/// `rel` is for glob matching and logs only. Anything written to the build
/// tree is derived from `rel_path`, which keeps non UTF-8 names intact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path relative to the source root, forward slashes (`css/site.scss`).
    pub rel: String,
    /// The same relative path, byte for byte as found on disk.
    pub rel_path: PathBuf,
    /// Path on disk (`<root>/css/site.scss`).
    pub path: PathBuf,
}

/// Recursively list every file under `root`, sorted by relative path.
///
/// Symlinked directories are not descended into; symlinks to files are
/// listed like regular files.
pub fn walk_files(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(PipelineError::ConfigError(format!(
            "source tree {:?} does not exist or is not a directory",
            root
        )));
    }

    let mut out = Vec::new();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                stack.push(path);
                continue;
            }

            if file_type.is_symlink() && !path.is_file() {
                trace!(?path, "skipping symlink that does not point at a file");
                continue;
            }

            let Ok(rel_path) = path.strip_prefix(root).map(Path::to_path_buf) else {
                continue;
            };
            if let Some(rel) = relative_slash_path(root, &path) {
                out.push(SourceFile {
                    rel,
                    rel_path,
                    path,
                });
            }
        }
    }

    out.sort();
    debug!(root = ?root, files = out.len(), "walked source tree");
    Ok(out)
}

/// Convert `path` into a string relative to `root`, with forward slashes.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}
