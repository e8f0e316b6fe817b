//! In-memory `ObjectStore` with fault injection.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use easy_s3::{LifecycleRule, ObjectInfo, ObjectStore, ObjectStream, PresignParams, StoreError};
use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct PutRecord {
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct MemoryStore {
    pub buckets: Mutex<HashSet<String>>,
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Keys whose download fails with a network error.
    pub failing_keys: Mutex<HashSet<String>>,
    /// Keys whose download panics inside the store call.
    pub panicking_keys: Mutex<HashSet<String>>,
    /// Listing yields an error in place of the entry at this index.
    pub list_error_at: Mutex<Option<usize>>,
    /// Bucket existence check fails as if the endpoint were unreachable.
    pub unreachable: Mutex<bool>,
    pub download_delay: Mutex<Option<Duration>>,

    pub lifecycle_xml: Mutex<Vec<String>>,
    pub puts: Mutex<Vec<PutRecord>>,
    pub download_attempts: Mutex<Vec<String>>,
    pub list_tokens: Mutex<Vec<CancellationToken>>,
    pub listed_entries: Arc<AtomicUsize>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::default();
        store.buckets.lock().unwrap().insert(bucket.to_string());
        store
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn fail_download(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn panic_on_download(&self, key: &str) {
        self.panicking_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_listing_at(&self, index: usize) {
        *self.list_error_at.lock().unwrap() = Some(index);
    }

    pub fn set_download_delay(&self, delay: Duration) {
        *self.download_delay.lock().unwrap() = Some(delay);
    }

    pub fn attempted(&self) -> Vec<String> {
        let mut keys = self.download_attempts.lock().unwrap().clone();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        if *self.unreachable.lock().unwrap() {
            return Err(StoreError::Network {
                message: "dns error: failed to lookup address".to_string(),
                retryable: true,
            });
        }
        Ok(self.buckets.lock().unwrap().contains(bucket))
    }

    async fn set_bucket_lifecycle(
        &self,
        _bucket: &str,
        rule: &LifecycleRule,
    ) -> Result<(), StoreError> {
        let mut rules = self.lifecycle_xml.lock().unwrap();
        let duplicate = rules
            .iter()
            .any(|xml| xml.contains(&format!("<ID>{}</ID>", rule.id)));
        if duplicate {
            return Err(StoreError::Service {
                message: "InvalidArgument: lifecycle rule id must be unique".to_string(),
            });
        }
        rules.push(rule.to_xml());
        Ok(())
    }

    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let body = body
            .collect()
            .await
            .map_err(|e| StoreError::Other {
                message: e.to_string(),
            })?
            .into_bytes()
            .to_vec();
        self.insert(key, &body);
        self.puts.lock().unwrap().push(PutRecord {
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        params: &PresignParams,
    ) -> Result<String, StoreError> {
        let disposition = params
            .response_content_disposition
            .as_deref()
            .unwrap_or("attachment");
        Ok(format!(
            "https://store.test/{}/{}?X-Amz-Expires={}&response-content-disposition={}",
            bucket,
            key,
            expires_in.as_secs(),
            disposition
        ))
    }

    fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        cancel: CancellationToken,
    ) -> ObjectStream {
        self.list_tokens.lock().unwrap().push(cancel);

        let error_at = *self.list_error_at.lock().unwrap();
        let items: Vec<Result<ObjectInfo, StoreError>> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .enumerate()
            .map(|(index, (key, body))| {
                if Some(index) == error_at {
                    Err(StoreError::Network {
                        message: "listing connection dropped".to_string(),
                        retryable: true,
                    })
                } else {
                    Ok(ObjectInfo::new(key.clone(), body.len() as u64))
                }
            })
            .collect();

        let listed = self.listed_entries.clone();
        stream::iter(items)
            .inspect(move |_| {
                listed.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }

    async fn get_object_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StoreError> {
        self.download_attempts.lock().unwrap().push(key.to_string());

        let panics = self.panicking_keys.lock().unwrap().contains(key);
        if panics {
            panic!("store crashed while fetching {}", key);
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.download_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.write_object(bucket, key, destination).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MemoryStore {
    async fn write_object(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StoreError> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(StoreError::Network {
                message: "connection reset by peer".to_string(),
                retryable: true,
            });
        }

        let body = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, body).await?;
        Ok(())
    }
}
