//! Error types for store calls and facade operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by a single object store call.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Object or bucket not found.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Credentials rejected or missing permissions.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Transport failure (dispatch, timeout, broken connection).
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// The store answered with an error we don't classify further.
    #[error("Service error: {message}")]
    Service { message: String },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    Io { path: String, message: String },

    /// Key can't be mapped to a local path.
    #[error("Invalid key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Request rejected before being sent (bad expiry, bad input).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Operation cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("{message}")]
    Other { message: String },
}

impl StoreError {
    /// Check if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Network { retryable, .. } => *retryable,
            StoreError::Service { .. } => true,
            StoreError::NotFound { .. }
            | StoreError::AccessDenied { .. }
            | StoreError::Io { .. }
            | StoreError::InvalidKey { .. }
            | StoreError::InvalidRequest { .. }
            | StoreError::Cancelled
            | StoreError::Other { .. } => false,
        }
    }

    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::io(String::new(), err)
    }
}

/// One object that could not be downloaded.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    /// Remote key that failed.
    pub key: String,
    /// Local path the object was meant to land at, if one was derived.
    pub destination: Option<PathBuf>,
    pub error: StoreError,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Every per-object failure of one directory download, in completion order.
#[derive(Debug, Clone)]
pub struct DownloadFailures {
    failures: Vec<FailureRecord>,
}

impl DownloadFailures {
    /// Returns `None` when there is nothing to report.
    pub(crate) fn from_records(failures: Vec<FailureRecord>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always false; an aggregate is only built from at least one failure.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Keys worth retrying individually.
    pub fn keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }

    pub fn into_records(self) -> Vec<FailureRecord> {
        self.failures
    }
}

impl fmt::Display for DownloadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to download {} object(s) from s3: [",
            self.failures.len()
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for DownloadFailures {}

/// Errors returned by the facade.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Store unreachable or credentials rejected while connecting.
    #[error("Failed to connect to s3: {source}")]
    Connection {
        #[source]
        source: StoreError,
    },

    #[error("s3 bucket ({bucket}) doesn't exist")]
    BucketNotFound { bucket: String },

    /// Enumerating a prefix failed; nothing after the failing entry was dispatched.
    #[error("Failed to list s3://{bucket}/{prefix}: {source}")]
    Listing {
        bucket: String,
        prefix: String,
        #[source]
        source: StoreError,
    },

    /// Work was attempted and some objects failed.
    #[error(transparent)]
    Download(DownloadFailures),

    /// Passed through from the store unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// True when some work completed and only individual objects need a retry.
    pub fn is_partial(&self) -> bool {
        matches!(self, Error::Download(_))
    }

    pub fn download_failures(&self) -> Option<&DownloadFailures> {
        match self {
            Error::Download(failures) => Some(failures),
            _ => None,
        }
    }
}
