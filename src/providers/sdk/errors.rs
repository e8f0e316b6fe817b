use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};

use crate::error::StoreError;

/// Classify an SDK failure by transport outcome, then by HTTP status.
pub(super) fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, bucket: &str, key: &str) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let message = DisplayErrorContext(&err).to_string();

    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StoreError::Network {
            message,
            retryable: true,
        },
        SdkError::ConstructionFailure(_) => StoreError::InvalidRequest { message },
        _ => match status {
            Some(404) => StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            Some(401) | Some(403) => StoreError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message,
            },
            Some(429) | Some(500..=599) => StoreError::Network {
                message,
                retryable: true,
            },
            _ => StoreError::Service { message },
        },
    }
}
