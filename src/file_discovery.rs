use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::ValidationError;

/// A file picked up by discovery, ready to be validated and reported once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path as found on disk (rooted at the discovery root)
    pub path: PathBuf,
    /// Path relative to the discovery root, for display
    pub relative_display_path: String,
}

impl FileRecord {
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative_display_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .display()
            .to_string();
        Self {
            path,
            relative_display_path,
        }
    }

    /// Final path component, if it is valid UTF-8
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Recursive, read-only file discovery keyed on a file name suffix
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Suffix a file name must end with (e.g. ".xaml")
    suffix: String,
    /// Descend into symlinked directories
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            suffix: ".xaml".to_string(),
            follow_symlinks: false,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Find every matching file under `root`, sorted byte-wise by full path.
    ///
    /// A missing (or non-directory) root yields no files; callers that need to
    /// tell "missing" from "empty" check the root themselves first.
    pub fn discover_files(&self, root: &Path) -> Vec<FileRecord> {
        if !root.is_dir() {
            debug!(root = %root.display(), "discovery root is not a directory");
            return Vec::new();
        }

        // Hidden and ignored files are still XAML the build will compile.
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(self.follow_symlinks)
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // A matching entry that cannot be followed (dangling link) is
                    // still reported, and fails validation.
                    if let Some(path) = error_path(&err)
                        && self.should_process(path)
                        && !path.is_dir()
                    {
                        debug!(path = %path.display(), "keeping unreadable entry: {}", err);
                        paths.push(path.to_path_buf());
                        continue;
                    }
                    let error = ValidationError::FileSystemTraversal {
                        path: root.to_path_buf(),
                        reason: err.to_string(),
                    };
                    warn!("skipping entry: {}", error);
                    continue;
                }
            };

            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }

            // Links to directories are skipped when they are not followed.
            let path = entry.into_path();
            if self.should_process(&path) && !path.is_dir() {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        debug!(root = %root.display(), count = paths.len(), "discovery finished");

        paths
            .into_iter()
            .map(|path| FileRecord::new(root, path))
            .collect()
    }

    /// Check whether a path's file name ends with the configured suffix
    pub fn should_process(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.suffix))
    }
}

/// Path attached to a walk error, if the error concerns one entry
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}
