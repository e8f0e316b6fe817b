//! `ObjectStore` backed by the AWS S3 SDK; works with AWS, MinIO, R2 and
//! other S3-compatible endpoints.

mod errors;
mod lifecycle;
mod list;
mod objects;
mod presigned;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio_util::sync::CancellationToken;

use super::s3_client::create_s3_client;
use super::store::{ObjectStore, ObjectStream, PresignParams};
use crate::config::S3Config;
use crate::error::StoreError;
use crate::lifecycle::LifecycleRule;

#[derive(Debug, Clone)]
pub struct SdkStore {
    client: Client,
}

impl SdkStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &S3Config) -> Self {
        Self::new(create_s3_client(config))
    }
}

#[async_trait]
impl ObjectStore for SdkStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        objects::bucket_exists(&self.client, bucket).await
    }

    async fn set_bucket_lifecycle(
        &self,
        bucket: &str,
        rule: &LifecycleRule,
    ) -> Result<(), StoreError> {
        lifecycle::put_lifecycle_rule(&self.client, bucket, rule).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StoreError> {
        objects::put_object(&self.client, bucket, key, body, content_type).await
    }

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        params: &PresignParams,
    ) -> Result<String, StoreError> {
        presigned::presigned_get_url(&self.client, bucket, key, expires_in, params).await
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        cancel: CancellationToken,
    ) -> ObjectStream {
        list::list_objects_recursive(self.client.clone(), bucket, prefix, cancel)
    }

    async fn get_object_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StoreError> {
        objects::get_object_to_file(&self.client, bucket, key, destination).await
    }
}
