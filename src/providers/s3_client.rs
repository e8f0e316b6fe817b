use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;

use crate::config::S3Config;

/// Build an SDK client with the static keys from `config`. No network traffic happens here.
pub fn create_s3_client(config: &S3Config) -> Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "easy-s3-static",
    );

    let mut builder = S3ConfigBuilder::new()
        .credentials_provider(credentials)
        .region(Region::new(config.region.clone()))
        .force_path_style(config.force_path_style);

    if let Some(endpoint_url) = config.endpoint_url() {
        builder = builder.endpoint_url(endpoint_url);
    }

    Client::from_conf(builder.build())
}
