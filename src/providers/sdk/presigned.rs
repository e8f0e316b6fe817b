use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use super::errors::map_sdk_error;
use crate::error::StoreError;
use crate::providers::store::PresignParams;

pub(super) async fn presigned_get_url(
    client: &Client,
    bucket: &str,
    key: &str,
    expires_in: Duration,
    params: &PresignParams,
) -> Result<String, StoreError> {
    let presigning_config = PresigningConfig::builder()
        .expires_in(expires_in)
        .build()
        .map_err(|e| StoreError::InvalidRequest {
            message: e.to_string(),
        })?;

    let mut request = client.get_object().bucket(bucket).key(key);

    if let Some(disposition) = &params.response_content_disposition {
        request = request.response_content_disposition(disposition);
    }

    let presigned_request = request
        .presigned(presigning_config)
        .await
        .map_err(|e| map_sdk_error(e, bucket, key))?;

    Ok(presigned_request.uri().to_string())
}
