//! Startup scan of a digest directory

use crate::error::{WatchError, WatchResult};
use crate::matcher::DigestMatcher;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// List files under `dir` whose name matches `pattern`, sorted by path
///
/// Unreadable subdirectories are logged and skipped; an unreadable root is an
/// error.
pub fn scan_existing(dir: &Path, pattern: &str, recursive: bool) -> WatchResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(WatchError::NotADirectory(dir.to_path_buf()));
    }
    let matcher = DigestMatcher::new(pattern)?;

    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    let mut is_root = true;

    while let Some(current) = pending.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(source) if is_root => {
                return Err(WatchError::Io {
                    path: current,
                    source,
                })
            }
            Err(e) => {
                warn!(path = %current.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };
        is_root = false;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if path.is_file() && matcher.matches(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    debug!(dir = %dir.display(), pattern, files = found.len(), "Scanned digest directory");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "word\n[B](b)").unwrap();
        fs::write(dir.path().join("a.txt"), "word\n[A](a)").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::create_dir(dir.path().join("older")).unwrap();
        fs::write(dir.path().join("older").join("c.txt"), "word\n[C](c)").unwrap();
        dir
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_flat_scan_is_sorted_and_filtered() {
        let dir = fixture();
        let found = scan_existing(dir.path(), "*.txt", false).unwrap();
        assert_eq!(names(&found, dir.path()), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_recursive_scan_descends() {
        let dir = fixture();
        let found = scan_existing(dir.path(), "*.txt", true).unwrap();
        assert_eq!(names(&found, dir.path()), vec!["a.txt", "b.txt", "older/c.txt"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = scan_existing(&dir.path().join("gone"), "*.txt", false).unwrap_err();
        assert!(matches!(err, WatchError::NotADirectory(_)));
    }
}
