use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, ExpirationStatus, LifecycleExpiration,
    LifecycleRule as SdkLifecycleRule,
};
use aws_sdk_s3::Client;

use super::errors::map_sdk_error;
use crate::error::StoreError;
use crate::lifecycle::LifecycleRule;

/// Submit the rule as the bucket's whole lifecycle configuration.
///
/// The rule-level `Prefix` element is used rather than `Filter` so the body
/// matches `LifecycleRule::to_xml`, which older S3-compatible stores expect.
#[allow(deprecated)]
fn build_configuration(rule: &LifecycleRule) -> Result<BucketLifecycleConfiguration, StoreError> {
    let invalid = |e: aws_sdk_s3::error::BuildError| StoreError::InvalidRequest {
        message: e.to_string(),
    };

    let sdk_rule = SdkLifecycleRule::builder()
        .id(&rule.id)
        .prefix(&rule.prefix)
        .status(ExpirationStatus::Enabled)
        .expiration(LifecycleExpiration::builder().days(rule.days).build())
        .build()
        .map_err(invalid)?;

    BucketLifecycleConfiguration::builder()
        .rules(sdk_rule)
        .build()
        .map_err(invalid)
}

pub(super) async fn put_lifecycle_rule(
    client: &Client,
    bucket: &str,
    rule: &LifecycleRule,
) -> Result<(), StoreError> {
    let configuration = build_configuration(rule)?;

    client
        .put_bucket_lifecycle_configuration()
        .bucket(bucket)
        .lifecycle_configuration(configuration)
        .send()
        .await
        .map_err(|e| map_sdk_error(e, bucket, ""))?;
    Ok(())
}
