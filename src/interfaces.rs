use crate::errors::StoreError;
use crate::source::SourceLocator;
use crate::upload::OverwritePolicy;
use async_trait::async_trait;
use mockall::automock;
use std::io::{self, Read};

/// Remote object store the uploader writes to.
#[automock]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/key`, honouring `overwrite`.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: OverwritePolicy,
    ) -> Result<(), StoreError>;

    /// Stable, externally fetchable address of `bucket/key`.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Turns a locator into something readable.
#[automock]
pub trait SourceResolver: Send + Sync {
    fn open(&self, locator: &SourceLocator) -> io::Result<Box<dyn Read + Send>>;
}

/// Completion interface for callers that prefer callbacks over futures.
///
/// Exactly one of the two methods is called per upload.
#[automock]
pub trait UploadCallback: Send + Sync {
    fn on_success(&self, public_url: String);
    fn on_failure(&self, reason: String);
}

/// Receives `(uploaded, total)` after each document of a batch finishes.
#[automock]
pub trait UploadProgress: Send + Sync {
    fn on_progress(&self, uploaded: usize, total: usize);
}

impl<F> UploadProgress for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, uploaded: usize, total: usize) {
        self(uploaded, total)
    }
}
