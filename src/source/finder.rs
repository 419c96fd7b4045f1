// src/source/finder.rs

//! Locate task-definition files under a source directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, trace};

use crate::fs::FileSystem;

/// Matches file names ending in a configured suffix (case-insensitive).
#[derive(Debug, Clone)]
pub struct TaskFileFinder {
    suffix: String,
    matcher: GlobMatcher,
}

impl TaskFileFinder {
    pub fn new(suffix: &str) -> Result<Self> {
        let pattern = format!("*{}", globset::escape(suffix));
        let matcher = GlobBuilder::new(&pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .with_context(|| format!("building task file pattern for suffix '{suffix}'"))?
            .compile_matcher();

        Ok(Self {
            suffix: suffix.to_string(),
            matcher,
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_task_file(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.is_match(Path::new(name)))
    }

    /// All matching files below `root`, recursively, in sorted path order.
    ///
    /// A missing `root` yields no files.
    pub fn find(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        if !fs.exists(root) {
            debug!(root = %root.display(), "task source path does not exist");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        if fs.is_file(root) {
            if self.is_task_file(root) {
                found.push(root.to_path_buf());
            }
            return Ok(found);
        }

        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs.read_dir(&dir)? {
                if fs.is_dir(&entry) {
                    pending.push(entry);
                } else if self.is_task_file(&entry) {
                    trace!(path = %entry.display(), "task file found");
                    found.push(entry);
                }
            }
        }

        found.sort();
        debug!(root = %root.display(), suffix = %self.suffix, count = found.len(), "task files found");
        Ok(found)
    }
}
