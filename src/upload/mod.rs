//! Upload a single source to an object store and resolve its public URL.

pub mod batch;
pub mod callback;
pub mod handle;

use crate::config::DEFAULT_MAX_CONCURRENT_UPLOADS;
use crate::errors::{Result, StoreError, UploadError};
use crate::interfaces::{ObjectStore, SourceResolver, UploadCallback};
use crate::source::{self, FsResolver, SourceLocator};
use std::sync::Arc;

pub use batch::BatchOutcome;
pub use callback::{ChannelCallback, UploadOutcome};
pub use handle::UploadHandle;

/// Whether an upload may replace an existing object at the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    #[default]
    Reject,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub source: SourceLocator,
    pub bucket: String,
    pub file_name: String,
    pub overwrite: OverwritePolicy,
}

impl UploadRequest {
    pub fn new(
        source: impl Into<SourceLocator>,
        bucket: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            bucket: bucket.into(),
            file_name: file_name.into(),
            overwrite: OverwritePolicy::Reject,
        }
    }

    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn validate(&self) -> std::result::Result<(), StoreError> {
        if self.bucket.trim().is_empty() {
            return Err(StoreError::InvalidRequest("bucket name is empty".into()));
        }
        if self.file_name.trim().is_empty() {
            return Err(StoreError::InvalidRequest("file name is empty".into()));
        }
        Ok(())
    }
}

/// Uploads sources to an injected object store.
///
/// Every upload runs as its own tokio task, so the methods that start one
/// must be called from within a tokio runtime.
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
    resolver: Arc<dyn SourceResolver>,
    max_concurrent_uploads: usize,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn ObjectStore>, resolver: Arc<dyn SourceResolver>) -> Self {
        Self {
            store,
            resolver,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
        }
    }

    /// Uploader reading sources from the local filesystem.
    pub fn with_fs(store: Arc<dyn ObjectStore>) -> Self {
        Self::new(store, Arc::new(FsResolver::new()))
    }

    pub fn with_max_concurrent_uploads(mut self, max: usize) -> Self {
        self.max_concurrent_uploads = max.max(1);
        self
    }

    pub fn max_concurrent_uploads(&self) -> usize {
        self.max_concurrent_uploads
    }

    /// Start an upload in the background and return a handle to its result.
    pub fn upload(&self, request: UploadRequest) -> UploadHandle {
        let store = Arc::clone(&self.store);
        let resolver = Arc::clone(&self.resolver);
        let bucket = request.bucket.clone();
        let key = request.file_name.clone();
        UploadHandle::spawn(bucket, key, run_upload(store, resolver, request))
    }

    /// Start an upload and report its outcome through `callback`, exactly once.
    ///
    /// The callback runs on the upload's task; use [`ChannelCallback`] to
    /// observe the outcome on another thread.
    pub fn upload_with_callback<C>(
        &self,
        request: UploadRequest,
        callback: C,
    ) -> tokio::task::JoinHandle<()>
    where
        C: UploadCallback + 'static,
    {
        let handle = self.upload(request);
        tokio::spawn(async move {
            match handle.await {
                Ok(url) => callback.on_success(url),
                Err(e) => callback.on_failure(e.reason()),
            }
        })
    }

    pub(crate) fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub(crate) fn resolver(&self) -> &Arc<dyn SourceResolver> {
        &self.resolver
    }
}

/// Read the whole source, store it, and resolve the public URL.
pub(crate) async fn run_upload(
    store: Arc<dyn ObjectStore>,
    resolver: Arc<dyn SourceResolver>,
    request: UploadRequest,
) -> Result<String> {
    request
        .validate()
        .map_err(|cause| UploadError::upload(&request.bucket, &request.file_name, cause))?;

    let UploadRequest {
        source: locator,
        bucket,
        file_name,
        overwrite,
    } = request;

    let content_type = locator.content_type();
    let to_read = locator.clone();
    // blocking and not cancellable; finishes before anything is sent
    let bytes = tokio::task::spawn_blocking(move || source::read_all(resolver.as_ref(), &to_read))
        .await
        .map_err(std::io::Error::other)
        .and_then(|read| read)
        .map_err(|e| {
            tracing::warn!(%locator, error = %e, "could not read upload source");
            UploadError::Read {
                locator: locator.to_string(),
                source: e,
            }
        })?;

    tracing::info!(
        bucket = %bucket,
        key = %file_name,
        size = bytes.len(),
        ?overwrite,
        "uploading"
    );

    store
        .put(&bucket, &file_name, bytes, content_type, overwrite)
        .await
        .map_err(|cause| {
            tracing::warn!(bucket = %bucket, key = %file_name, error = %cause, "upload failed");
            UploadError::upload(&bucket, &file_name, cause)
        })?;

    let url = store.public_url(&bucket, &file_name);
    tracing::info!(%url, "upload complete");
    Ok(url)
}
