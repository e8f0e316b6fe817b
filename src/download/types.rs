//! Download task derivation and options

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DOWNLOAD_CONCURRENCY;
use crate::error::StoreError;
use crate::providers::store::{ObjectInfo, SEPARATOR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Maximum number of objects transferred at once. Values above what a
    /// semaphore can hold act as unbounded; zero acts as one.
    pub concurrency: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
        }
    }
}

impl DownloadOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self { concurrency }
    }
}

/// Outcome of a directory download where every object succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped_markers: usize,
}

/// One object and the local file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub key: String,
    pub destination: PathBuf,
}

impl DownloadTask {
    /// Map a listed object under `prefix` to a path under `local_root`.
    ///
    /// `prefix` must already be normalized with [`normalize_prefix`].
    /// Returns `Ok(None)` for directory markers. Keys whose remainder holds
    /// empty, `.` or `..` segments are rejected so that distinct keys never
    /// share a destination and nothing is written outside `local_root`.
    pub fn for_object(
        prefix: &str,
        local_root: &Path,
        object: &ObjectInfo,
    ) -> Result<Option<Self>, StoreError> {
        if object.is_directory() {
            return Ok(None);
        }

        let invalid = |reason: &str| StoreError::InvalidKey {
            key: object.key.clone(),
            reason: reason.to_string(),
        };

        let relative = object
            .key
            .strip_prefix(prefix)
            .ok_or_else(|| invalid("outside the requested prefix"))?;

        let mut destination = local_root.to_path_buf();
        for segment in relative.split(SEPARATOR) {
            match segment {
                "" => return Err(invalid("empty path segment")),
                "." | ".." => return Err(invalid("relative path segment")),
                _ => destination.push(segment),
            }
        }

        Ok(Some(Self {
            key: object.key.clone(),
            destination,
        }))
    }
}

/// `reports/2024` and `reports/2024/` both list the folder `reports/2024/`;
/// an empty prefix (or a bare separator) means the whole bucket.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return String::new();
    }
    let mut normalized = trimmed.to_string();
    normalized.push(SEPARATOR);
    normalized
}
