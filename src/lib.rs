//! Narrow facade over S3-compatible object storage
//!
//! - `service`: bucket-bound facade (lifecycle rule, upload, presigned links, downloads)
//! - `download`: concurrent recursive directory download
//! - `providers`: the `ObjectStore` seam and its AWS SDK implementation
//! - `lifecycle`: single-rule lifecycle policies
//! - `config`: connection and tuning settings

pub mod config;
pub mod download;
pub mod error;
pub mod lifecycle;
pub mod providers;
pub mod service;

pub use config::S3Config;
pub use download::{DownloadOptions, DownloadSummary, DownloadTask};
pub use error::{DownloadFailures, Error, FailureRecord, Result, StoreError};
pub use lifecycle::LifecycleRule;
pub use providers::{ObjectInfo, ObjectStore, ObjectStream, PresignParams, SdkStore};
pub use service::S3Service;
