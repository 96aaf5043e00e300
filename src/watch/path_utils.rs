// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

use crate::classify::relative_slash_path;

/// Convert an event path into a string relative to `root`, with forward
/// slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be related to `root`. Deleted files
/// cannot be canonicalized, so the fast path matters for removals.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Some(rel) = relative_slash_path(root, path) {
        return Some(rel);
    }

    // macOS reports /private/var/... for /var/... and similar.
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        return relative_slash_path(&root_canon, &path_canon);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/proj/src"), Path::new("/proj/src/css/a.scss")),
            Some("css/a.scss".to_string())
        );
    }

    #[test]
    fn unrelated_paths_are_rejected() {
        assert_eq!(
            relative_str(Path::new("/proj/src"), Path::new("/elsewhere/a.scss")),
            None
        );
    }

    #[test]
    fn root_itself_is_not_a_file_event() {
        assert_eq!(relative_str(Path::new("/proj/src"), Path::new("/proj/src")), None);
    }
}
