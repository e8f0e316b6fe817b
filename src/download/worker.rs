//! Directory download orchestrator - fan out one task per object, fan in failures

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use super::types::{normalize_prefix, DownloadOptions, DownloadSummary, DownloadTask};
use crate::error::{DownloadFailures, Error, FailureRecord, Result, StoreError};
use crate::providers::store::ObjectStore;

/// Download every object under `remote_prefix` into `local_root`.
///
/// A listing error stops dispatch at once and is returned as
/// [`Error::Listing`] after the workers already started have finished.
/// Per-object failures never stop siblings; they are returned together as
/// [`Error::Download`] once every worker is done.
pub async fn download_directory(
    store: Arc<dyn ObjectStore>,
    bucket: &str,
    remote_prefix: &str,
    local_root: &Path,
    options: &DownloadOptions,
) -> Result<DownloadSummary> {
    let prefix = normalize_prefix(remote_prefix);

    // Tears the listing down on every return path.
    let cancel = CancellationToken::new();
    let _cancel_on_exit = cancel.clone().drop_guard();

    let permits = options.concurrency.clamp(1, Semaphore::MAX_PERMITS);

    info!(
        "download_dir_start: s3://{}/{} -> {} concurrency={}",
        bucket,
        prefix,
        local_root.display(),
        permits
    );

    let semaphore = Arc::new(Semaphore::new(permits));
    let downloaded = Arc::new(AtomicUsize::new(0));
    // Unbounded: workers must never block on send while we wait at the barrier.
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel::<FailureRecord>();
    let mut in_flight = FuturesUnordered::new();
    let mut dispatched = 0usize;
    let mut skipped_markers = 0usize;
    let mut listing_error: Option<StoreError> = None;

    let mut objects = store.list_objects(bucket, &prefix, cancel.clone());

    while let Some(item) = objects.next().await {
        let object = match item {
            Ok(object) => object,
            Err(err) => {
                warn!(
                    "download_dir_list_failed: s3://{}/{} dispatched={} error={}",
                    bucket, prefix, dispatched, err
                );
                listing_error = Some(err);
                break;
            }
        };

        let task = match DownloadTask::for_object(&prefix, local_root, &object) {
            Ok(Some(task)) => task,
            Ok(None) => {
                debug!("download_dir_skip_marker: {}", object.key);
                skipped_markers += 1;
                continue;
            }
            Err(error) => {
                warn!("download_dir_bad_key: {} error={}", object.key, error);
                let _ = failure_tx.send(FailureRecord {
                    key: object.key,
                    destination: None,
                    error,
                });
                continue;
            }
        };

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let key = task.key.clone();
        let store = store.clone();
        let bucket = bucket.to_string();
        let downloaded = downloaded.clone();
        let worker_tx = failure_tx.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit; // Hold permit until done

            debug!(
                "download_object_start: {} -> {}",
                task.key,
                task.destination.display()
            );

            match store
                .get_object_to_file(&bucket, &task.key, &task.destination)
                .await
            {
                Ok(()) => {
                    downloaded.fetch_add(1, Ordering::SeqCst);
                }
                Err(error) => {
                    warn!("download_object_failed: {} error={}", task.key, error);
                    let _ = worker_tx.send(FailureRecord {
                        key: task.key,
                        destination: Some(task.destination),
                        error,
                    });
                }
            }
        });

        in_flight.push(async move { (key, handle.await) });
        dispatched += 1;

        // Reap finished workers so large listings don't pile up handles.
        while let Some((key, joined)) = in_flight.next().now_or_never().flatten() {
            record_join_failure(&failure_tx, key, joined);
        }
    }

    drop(objects);
    cancel.cancel();

    // Barrier: no result is reported until every dispatched worker is done.
    while let Some((key, joined)) = in_flight.next().await {
        record_join_failure(&failure_tx, key, joined);
    }
    drop(failure_tx);

    let mut failures = Vec::new();
    while let Some(failure) = failure_rx.recv().await {
        failures.push(failure);
    }

    if let Some(source) = listing_error {
        if !failures.is_empty() {
            warn!(
                "download_dir_abandoned_failures: s3://{}/{} count={}",
                bucket,
                prefix,
                failures.len()
            );
        }
        return Err(Error::Listing {
            bucket: bucket.to_string(),
            prefix,
            source,
        });
    }

    let summary = DownloadSummary {
        downloaded: downloaded.load(Ordering::SeqCst),
        skipped_markers,
    };

    match DownloadFailures::from_records(failures) {
        None => {
            info!(
                "download_dir_finish: s3://{}/{} downloaded={} skipped_markers={}",
                bucket, prefix, summary.downloaded, summary.skipped_markers
            );
            Ok(summary)
        }
        Some(failures) => {
            warn!(
                "download_dir_partial: s3://{}/{} downloaded={} failed={}",
                bucket,
                prefix,
                summary.downloaded,
                failures.len()
            );
            Err(Error::Download(failures))
        }
    }
}

/// A worker that panicked never reported for itself.
fn record_join_failure(
    failure_tx: &mpsc::UnboundedSender<FailureRecord>,
    key: String,
    joined: std::result::Result<(), JoinError>,
) {
    if let Err(join_error) = joined {
        warn!("download_object_panicked: {} error={}", key, join_error);
        let _ = failure_tx.send(FailureRecord {
            key,
            destination: None,
            error: StoreError::Other {
                message: format!("Download worker failed: {}", join_error),
            },
        });
    }
}
