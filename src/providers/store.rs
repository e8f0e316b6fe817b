//! The object store capabilities the facade and the download orchestrator rely on.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use futures_util::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::lifecycle::LifecycleRule;

/// Separator used by the store to fake a directory hierarchy.
pub const SEPARATOR: char = '/';

/// Lazy listing of every object under a prefix.
pub type ObjectStream = BoxStream<'static, Result<ObjectInfo, StoreError>>;

/// An object yielded by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
        }
    }

    /// Zero-content keys ending in `/` that stand in for empty folders.
    pub fn is_directory(&self) -> bool {
        self.key.ends_with(SEPARATOR)
    }
}

/// Response overrides baked into presigned GET URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresignParams {
    pub response_content_disposition: Option<String>,
}

impl PresignParams {
    /// Browsers display the object instead of downloading it.
    pub fn inline() -> Self {
        Self {
            response_content_disposition: Some("inline".to_string()),
        }
    }
}

/// Low-level store operations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// Replace the bucket lifecycle configuration with a single rule.
    async fn set_bucket_lifecycle(
        &self,
        bucket: &str,
        rule: &LifecycleRule,
    ) -> Result<(), StoreError>;

    /// Upload a streamed body whose length the caller doesn't need to know.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StoreError>;

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        params: &PresignParams,
    ) -> Result<String, StoreError>;

    /// Recursively list `prefix`. The stream ends early once `cancel` fires.
    fn list_objects(&self, bucket: &str, prefix: &str, cancel: CancellationToken)
        -> ObjectStream;

    /// Stream an object to `destination`, creating parent directories.
    async fn get_object_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StoreError>;
}
