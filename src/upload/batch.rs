use crate::errors::{Result, StoreError, UploadError};
use crate::interfaces::UploadProgress;
use crate::naming::{self, Bucket};
use crate::source::SourceLocator;
use crate::upload::{ImageUploader, UploadHandle, UploadRequest, run_upload};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What a document batch produced. URLs are in completion order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub urls: Vec<String>,
    pub failures: Vec<UploadError>,
}

impl ImageUploader {
    /// Upload a user's verification documents into `doctor-certificates`.
    ///
    /// At most `max_concurrent_uploads` documents are in flight. `progress`
    /// hears about every successful document. Succeeds when at least one
    /// document was stored; when none was, the last failure is returned.
    pub async fn upload_documents(
        &self,
        user_id: &str,
        sources: Vec<SourceLocator>,
        progress: Arc<dyn UploadProgress>,
    ) -> Result<BatchOutcome> {
        let bucket = Bucket::DoctorCertificates.as_str();
        if user_id.trim().is_empty() {
            return Err(UploadError::upload(
                bucket,
                user_id,
                StoreError::InvalidRequest("user id is empty".into()),
            ));
        }

        let total = sources.len();
        let millis = naming::now_millis();
        let permits = Arc::new(Semaphore::new(self.max_concurrent_uploads()));
        let mut tasks = JoinSet::new();

        tracing::info!(user_id, total, "uploading documents");

        for (index, source) in sources.into_iter().enumerate() {
            let key = naming::certificate_key(user_id, millis, index, &source.extension_or_default());
            let request = UploadRequest::new(source, bucket, key.clone());
            let store = Arc::clone(self.store());
            let resolver = Arc::clone(self.resolver());
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // the semaphore is never closed, so the permit is always granted
                let _permit = permits.acquire_owned().await;
                UploadHandle::spawn(bucket.to_string(), key, run_upload(store, resolver, request)).await
            });
        }

        let mut outcome = BatchOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(url)) => {
                    outcome.urls.push(url);
                    progress.on_progress(outcome.urls.len(), total);
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "document upload failed");
                    outcome.failures.push(e);
                }
                // the wrapper only awaits its handle, which already reports panics per key
                Err(e) => {
                    tracing::warn!(error = %e, "document task stopped");
                    outcome.failures.push(UploadError::Cancelled);
                }
            }
        }

        tracing::info!(
            uploaded = outcome.urls.len(),
            failed = outcome.failures.len(),
            "document batch finished"
        );

        if outcome.urls.is_empty() {
            if let Some(last) = outcome.failures.pop() {
                return Err(last);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{MockUploadProgress, ObjectStore, SourceResolver};
    use crate::storage::InMemoryStore;
    use crate::upload::OverwritePolicy;
    use async_trait::async_trait;
    use std::io::{self, Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves every locator except those containing "missing".
    struct FakeResolver;

    impl SourceResolver for FakeResolver {
        fn open(&self, locator: &SourceLocator) -> io::Result<Box<dyn Read + Send>> {
            if locator.as_str().contains("missing") {
                return Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
            }
            Ok(Box::new(Cursor::new(locator.as_str().as_bytes().to_vec())))
        }
    }

    /// Records the highest number of concurrent puts.
    #[derive(Default)]
    struct SlowStore {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for SlowStore {
        async fn put(
            &self,
            _bucket: &str,
            _key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
            _overwrite: OverwritePolicy,
        ) -> std::result::Result<(), StoreError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }

        fn public_url(&self, bucket: &str, key: &str) -> String {
            format!("slow://{bucket}/{key}")
        }
    }

    /// Panics while storing any key ending in `_1.pdf`.
    struct PanickyStore;

    #[async_trait]
    impl ObjectStore for PanickyStore {
        async fn put(
            &self,
            _bucket: &str,
            key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
            _overwrite: OverwritePolicy,
        ) -> std::result::Result<(), StoreError> {
            if key.ends_with("_1.pdf") {
                panic!("store blew up on {key}");
            }
            Ok(())
        }

        fn public_url(&self, bucket: &str, key: &str) -> String {
            format!("panicky://{bucket}/{key}")
        }
    }

    fn locators(names: &[&str]) -> Vec<SourceLocator> {
        names.iter().map(|n| SourceLocator::new(*n)).collect()
    }

    #[tokio::test]
    async fn stores_each_document_under_the_user() {
        let store = Arc::new(InMemoryStore::new());
        let uploader = ImageUploader::new(store.clone(), Arc::new(FakeResolver));

        let mut progress = MockUploadProgress::new();
        progress
            .expect_on_progress()
            .withf(|_, total| *total == 2)
            .times(2)
            .return_const(());

        let outcome = uploader
            .upload_documents("u7", locators(&["scan.png", "licence"]), Arc::new(progress))
            .await
            .unwrap();

        assert_eq!(outcome.urls.len(), 2);
        assert!(outcome.failures.is_empty());
        let mut urls = outcome.urls.clone();
        urls.sort();
        assert!(urls[0].starts_with("memory://doctor-certificates/u7/certificate_"));
        assert!(urls.iter().any(|u| u.ends_with("_0.png")));
        assert!(urls.iter().any(|u| u.ends_with("_1.pdf")));
        for url in &outcome.urls {
            assert!(store.fetch(url).is_some());
        }
    }

    #[tokio::test]
    async fn partial_failure_still_succeeds() {
        let uploader = ImageUploader::new(Arc::new(InMemoryStore::new()), Arc::new(FakeResolver));
        let outcome = uploader
            .upload_documents(
                "u1",
                locators(&["a.pdf", "missing.pdf", "b.pdf"]),
                Arc::new(|_: usize, _: usize| {}),
            )
            .await
            .unwrap();
        assert_eq!(outcome.urls.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].is_read_error());
    }

    #[tokio::test]
    async fn all_failed_returns_last_error() {
        let uploader = ImageUploader::new(Arc::new(InMemoryStore::new()), Arc::new(FakeResolver));
        let mut progress = MockUploadProgress::new();
        progress.expect_on_progress().times(0);

        let err = uploader
            .upload_documents("u1", locators(&["missing1", "missing2"]), Arc::new(progress))
            .await
            .unwrap_err();
        assert!(err.is_read_error());
    }

    #[tokio::test]
    async fn empty_batch_is_ok() {
        let uploader = ImageUploader::new(Arc::new(InMemoryStore::new()), Arc::new(FakeResolver));
        let outcome = uploader
            .upload_documents("u1", Vec::new(), Arc::new(|_: usize, _: usize| {}))
            .await
            .unwrap();
        assert!(outcome.urls.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn in_flight_uploads_are_bounded() {
        let store = Arc::new(SlowStore::default());
        let uploader = ImageUploader::new(store.clone(), Arc::new(FakeResolver))
            .with_max_concurrent_uploads(3);
        let names: Vec<String> = (0..10).map(|i| format!("doc{i}.pdf")).collect();
        let sources = names.iter().map(|n| SourceLocator::new(n.as_str())).collect();

        let outcome = uploader
            .upload_documents("u1", sources, Arc::new(|_: usize, _: usize| {}))
            .await
            .unwrap();
        assert_eq!(outcome.urls.len(), 10);
        let peak = store.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak in-flight was {peak}");
    }

    #[tokio::test]
    async fn blank_user_id_is_rejected_before_uploading() {
        let store = Arc::new(InMemoryStore::new());
        let uploader = ImageUploader::new(store.clone(), Arc::new(FakeResolver));

        for user_id in ["", "   "] {
            let err = uploader
                .upload_documents(user_id, locators(&["a.pdf"]), Arc::new(|_: usize, _: usize| {}))
                .await
                .unwrap_err();
            assert!(matches!(
                err.store_cause(),
                Some(StoreError::InvalidRequest(_))
            ));
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn panicking_upload_is_reported_under_its_own_key() {
        let uploader = ImageUploader::new(Arc::new(PanickyStore), Arc::new(FakeResolver));
        let outcome = uploader
            .upload_documents("u3", locators(&["a.pdf", "b.pdf"]), Arc::new(|_: usize, _: usize| {}))
            .await
            .unwrap();

        assert_eq!(outcome.urls.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        match &outcome.failures[0] {
            UploadError::Upload { bucket, key, cause } => {
                assert_eq!(bucket, "doctor-certificates");
                assert!(key.starts_with("u3/certificate_") && key.ends_with("_1.pdf"), "key was {key}");
                assert!(matches!(cause, StoreError::Transport(m) if m.starts_with("upload task failed")));
            }
            other => panic!("unexpected failure {other:?}"),
        }
    }
}
