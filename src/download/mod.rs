//! Recursive directory download
//!
//! Lists a remote prefix lazily and downloads every object under it to a
//! mirrored local tree:
//! - One spawned task per object, bounded by a semaphore
//! - Listing errors abort immediately; per-object errors are collected
//! - The listing is cancelled whenever the call returns

mod types;
mod worker;

pub use types::{DownloadOptions, DownloadSummary, DownloadTask};
pub use worker::download_directory;
