use aws_sdk_s3::Client;
use futures_util::stream::{self, StreamExt};
use log::debug;
use tokio_util::sync::CancellationToken;

use super::errors::map_sdk_error;
use crate::error::StoreError;
use crate::providers::store::{ObjectInfo, ObjectStream};

const LIST_PAGE_SIZE: i32 = 1000;

struct ListState {
    client: Client,
    bucket: String,
    prefix: String,
    continuation_token: Option<String>,
    finished: bool,
    cancel: CancellationToken,
}

/// Page through ListObjectsV2 lazily; a page is only requested once the
/// previous one has been consumed. An error ends the stream after being yielded.
pub(super) fn list_objects_recursive(
    client: Client,
    bucket: &str,
    prefix: &str,
    cancel: CancellationToken,
) -> ObjectStream {
    let state = ListState {
        client,
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        continuation_token: None,
        finished: false,
        cancel,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        let mut request = state
            .client
            .list_objects_v2()
            .bucket(&state.bucket)
            .max_keys(LIST_PAGE_SIZE);

        if !state.prefix.is_empty() {
            request = request.prefix(&state.prefix);
        }
        if let Some(token) = &state.continuation_token {
            request = request.continuation_token(token);
        }

        let response = tokio::select! {
            _ = state.cancel.cancelled() => {
                debug!("list_cancelled: s3://{}/{}", state.bucket, state.prefix);
                return None;
            }
            response = request.send() => response,
        };

        match response {
            Ok(response) => {
                let objects: Vec<Result<ObjectInfo, StoreError>> = response
                    .contents()
                    .iter()
                    .filter_map(|obj| {
                        let key = obj.key()?.to_string();
                        Some(Ok(ObjectInfo {
                            key,
                            size: obj.size().unwrap_or(0).max(0) as u64,
                            last_modified: obj.last_modified().map(|dt| dt.to_string()),
                            etag: obj.e_tag().map(|s| s.to_string()),
                        }))
                    })
                    .collect();

                state.continuation_token =
                    response.next_continuation_token().map(|s| s.to_string());
                state.finished =
                    !response.is_truncated().unwrap_or(false) || state.continuation_token.is_none();

                Some((objects, state))
            }
            Err(err) => {
                state.finished = true;
                let error = map_sdk_error(err, &state.bucket, &state.prefix);
                Some((vec![Err(error)], state))
            }
        }
    })
    .flat_map(stream::iter)
    .boxed()
}
