//! The facade applications talk to.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use log::{debug, info};
use serde::Serialize;

use crate::config::S3Config;
use crate::download::{self, DownloadOptions, DownloadSummary};
use crate::error::{Error, Result, StoreError};
use crate::lifecycle::LifecycleRule;
use crate::providers::sdk::SdkStore;
use crate::providers::store::{ObjectStore, PresignParams};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A verified bucket plus the defaults every operation shares.
///
/// Immutable after construction; clones share the same store handle.
#[derive(Clone)]
pub struct S3Service {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    presign_params: PresignParams,
    link_expiry: Duration,
    download_options: DownloadOptions,
}

impl std::fmt::Debug for S3Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Service")
            .field("bucket", &self.bucket)
            .field("presign_params", &self.presign_params)
            .field("link_expiry", &self.link_expiry)
            .field("download_options", &self.download_options)
            .finish_non_exhaustive()
    }
}

impl S3Service {
    /// Connect to the configured endpoint and make sure the bucket exists.
    pub async fn connect(config: &S3Config) -> Result<Self> {
        config.validate()?;
        let store = SdkStore::from_config(config);
        Self::with_store(Arc::new(store), config).await
    }

    /// Same checks as [`S3Service::connect`] over any store implementation.
    pub async fn with_store(store: Arc<dyn ObjectStore>, config: &S3Config) -> Result<Self> {
        config.validate()?;

        let exists = store
            .bucket_exists(&config.bucket)
            .await
            .map_err(|source| Error::Connection { source })?;

        if !exists {
            return Err(Error::BucketNotFound {
                bucket: config.bucket.clone(),
            });
        }

        info!(
            "s3_service_ready: bucket={} endpoint={}",
            config.bucket,
            config.endpoint_url().as_deref().unwrap_or("aws")
        );

        Ok(Self {
            store,
            bucket: config.bucket.clone(),
            presign_params: PresignParams::inline(),
            link_expiry: Duration::from_secs(config.link_expiry_secs),
            download_options: DownloadOptions::with_concurrency(config.download_concurrency),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Expire objects under `folder_path` after `days_to_expiry` days.
    ///
    /// Replaces the bucket's lifecycle configuration. `rule_id` must be
    /// unique; the store reports collisions.
    pub async fn add_lifecycle_rule(
        &self,
        rule_id: &str,
        folder_path: &str,
        days_to_expiry: i32,
    ) -> Result<()> {
        let rule = LifecycleRule::new(rule_id, folder_path, days_to_expiry);
        debug!("lifecycle_rule_put: bucket={} {}", self.bucket, rule.to_xml());
        self.store.set_bucket_lifecycle(&self.bucket, &rule).await?;
        Ok(())
    }

    pub async fn upload(
        &self,
        path: &str,
        data: impl Into<ByteStream>,
        content_type: &str,
    ) -> Result<()> {
        self.store
            .put_object(&self.bucket, path, data.into(), content_type)
            .await?;
        debug!("upload_finish: s3://{}/{}", self.bucket, path);
        Ok(())
    }

    pub async fn upload_json_file(&self, path: &str, data: impl Into<ByteStream>) -> Result<()> {
        self.upload(path, data, JSON_CONTENT_TYPE).await
    }

    /// Serialize `value` and upload it as JSON.
    pub async fn upload_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<()> {
        let body = serde_json::to_vec(value).map_err(|e| StoreError::InvalidRequest {
            message: format!("Failed to serialize JSON: {}", e),
        })?;
        self.upload_json_file(path, body).await
    }

    /// Upload JSON and return a link valid for the configured link expiry.
    pub async fn upload_json_file_with_link(
        &self,
        path: &str,
        data: impl Into<ByteStream>,
    ) -> Result<String> {
        self.upload_json_file(path, data).await?;
        self.file_url(path, self.link_expiry).await
    }

    /// Presigned GET URL displayed inline by browsers.
    pub async fn file_url(&self, path: &str, expiration: Duration) -> Result<String> {
        let url = self
            .store
            .presigned_get_object(&self.bucket, path, expiration, &self.presign_params)
            .await?;
        Ok(url)
    }

    pub async fn download_file(&self, path: &str, local_path: impl AsRef<Path>) -> Result<()> {
        self.store
            .get_object_to_file(&self.bucket, path, local_path.as_ref())
            .await?;
        Ok(())
    }

    /// Concurrently download the remote folder `path` into `local_path`.
    pub async fn download_directory(
        &self,
        path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<DownloadSummary> {
        download::download_directory(
            self.store.clone(),
            &self.bucket,
            path,
            local_path.as_ref(),
            &self.download_options,
        )
        .await
    }
}
