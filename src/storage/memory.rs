use crate::errors::StoreError;
use crate::interfaces::ObjectStore;
use crate::upload::OverwritePolicy;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

const URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Process-local object store. Used by tests and `--dry-run`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    // None accepts any bucket
    buckets: Option<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the listed buckets exist; writes elsewhere fail with `NotFound`.
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            objects: Mutex::new(HashMap::new()),
            buckets: Some(buckets.into_iter().map(Into::into).collect()),
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Resolve a URL previously returned by `public_url`.
    pub fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let rest = url.strip_prefix(URL_SCHEME)?;
        let (bucket, key) = rest.split_once('/')?;
        self.get(bucket, key).map(|o| o.bytes)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), StoredObject>> {
        // a poisoned map is still consistent: every write is a single insert
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: OverwritePolicy,
    ) -> Result<(), StoreError> {
        if let Some(buckets) = &self.buckets {
            if !buckets.contains(bucket) {
                return Err(StoreError::NotFound(format!("bucket {bucket}")));
            }
        }

        // check and insert under one lock so Reject is atomic
        let mut objects = self.lock();
        let slot = (bucket.to_string(), key.to_string());
        if overwrite == OverwritePolicy::Reject && objects.contains_key(&slot) {
            tracing::debug!(bucket, key, "object exists, rejecting write");
            return Err(StoreError::AlreadyExists);
        }
        objects.insert(
            slot,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{URL_SCHEME}{bucket}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reject_keeps_original_bytes() {
        let store = InMemoryStore::new();
        store
            .put("b", "k", vec![1, 2, 3], "image/jpeg", OverwritePolicy::Reject)
            .await
            .unwrap();
        let err = store
            .put("b", "k", vec![9], "image/jpeg", OverwritePolicy::Reject)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists);
        assert_eq!(store.get("b", "k").unwrap().bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn overwrite_replaces() {
        let store = InMemoryStore::new();
        store
            .put("b", "k", vec![1], "image/png", OverwritePolicy::Reject)
            .await
            .unwrap();
        store
            .put("b", "k", vec![2], "image/png", OverwritePolicy::Overwrite)
            .await
            .unwrap();
        assert_eq!(store.fetch(&store.public_url("b", "k")), Some(vec![2]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_bucket_is_not_found() {
        let store = InMemoryStore::with_buckets(["doctor-profiles"]);
        let err = store
            .put("elsewhere", "k", vec![], "image/png", OverwritePolicy::Overwrite)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn nested_keys_fetch() {
        let store = InMemoryStore::new();
        let url = store.public_url("chat-images", "chat_images/c1/5.jpg");
        assert_eq!(url, "memory://chat-images/chat_images/c1/5.jpg");
        assert_eq!(store.fetch(&url), None);
        assert_eq!(store.fetch("https://elsewhere/x"), None);
    }
}
