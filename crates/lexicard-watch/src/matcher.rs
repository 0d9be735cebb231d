//! File name matching

use crate::error::{WatchError, WatchResult};
use globset::{Glob, GlobMatcher};
use std::path::Path;

/// Matches digest files by file name against one glob
#[derive(Debug, Clone)]
pub struct DigestMatcher {
    pattern: String,
    glob: GlobMatcher,
}

impl DigestMatcher {
    pub fn new(pattern: &str) -> WatchResult<Self> {
        let glob = Glob::new(pattern).map_err(|e| WatchError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            glob: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the file name of `path` matches. Paths without a file name never match.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.glob.is_match(Path::new(name)))
    }
}
