use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::errors::map_sdk_error;
use crate::error::StoreError;

/// Write buffer size for downloads (2 MB) - reduces I/O operations
const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

pub(super) async fn bucket_exists(client: &Client, bucket: &str) -> Result<bool, StoreError> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(err) => match map_sdk_error(err, bucket, "") {
            StoreError::NotFound { .. } => Ok(false),
            other => Err(other),
        },
    }
}

pub(super) async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    body: ByteStream,
    content_type: &str,
) -> Result<(), StoreError> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body)
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| map_sdk_error(e, bucket, key))?;
    Ok(())
}

pub(super) async fn get_object_to_file(
    client: &Client,
    bucket: &str,
    key: &str,
    destination: &Path,
) -> Result<(), StoreError> {
    let response = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| map_sdk_error(e, bucket, key))?;

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
    }

    let file = File::create(destination)
        .await
        .map_err(|e| StoreError::io(destination.display().to_string(), e))?;

    let result = write_body(response.body, file, destination).await;
    if result.is_err() {
        // Leave nothing half-written behind.
        let _ = tokio::fs::remove_file(destination).await;
    }
    result
}

async fn write_body(mut body: ByteStream, file: File, path: &Path) -> Result<(), StoreError> {
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    while let Some(chunk) = body.try_next().await.map_err(|e| StoreError::Network {
        message: format!("Failed to read chunk: {}", e),
        retryable: true,
    })? {
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;
    }

    writer
        .flush()
        .await
        .map_err(|e| StoreError::io(path.display().to_string(), e))?;
    Ok(())
}
