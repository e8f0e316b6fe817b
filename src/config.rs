//! Connection and tuning settings for the facade.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of objects downloaded at once by a directory download.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 10;

/// Default lifetime of links returned after an upload (24 hours).
pub const DEFAULT_LINK_EXPIRY_SECS: u64 = 24 * 60 * 60;

/// SigV4 presigned URLs can't outlive seven days.
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_download_concurrency() -> usize {
    DEFAULT_DOWNLOAD_CONCURRENCY
}

fn default_link_expiry_secs() -> u64 {
    DEFAULT_LINK_EXPIRY_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_scheme")]
    pub endpoint_scheme: String,
    /// Host (and optional port) of an S3-compatible endpoint. `None` uses AWS.
    #[serde(default)]
    pub endpoint_host: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,
    #[serde(default = "default_link_expiry_secs")]
    pub link_expiry_secs: u64,
}

impl S3Config {
    pub fn new(
        endpoint_host: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: default_region(),
            endpoint_scheme: default_scheme(),
            endpoint_host: Some(endpoint_host.into()),
            force_path_style: false,
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            link_expiry_secs: DEFAULT_LINK_EXPIRY_SECS,
        }
    }

    pub fn endpoint_url(&self) -> Option<String> {
        let host = self.endpoint_host.as_ref()?.trim();
        if host.is_empty() {
            return None;
        }
        Some(format!("{}://{}", self.endpoint_scheme, host))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfig {
                message: message.to_string(),
            })
        };

        if self.bucket.trim().is_empty() {
            return invalid("bucket must not be empty");
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return invalid("access key id and secret must not be empty");
        }
        if self.endpoint_scheme != "http" && self.endpoint_scheme != "https" {
            return invalid("endpoint scheme must be http or https");
        }
        if self.download_concurrency == 0 {
            return invalid("download concurrency must be at least 1");
        }
        if self.link_expiry_secs == 0 || self.link_expiry_secs > MAX_PRESIGN_EXPIRY_SECS {
            return invalid("link expiry must be between 1 second and 7 days");
        }
        Ok(())
    }
}
