use crate::errors::{StoreError, UploadError};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// Handle to one background upload.
///
/// Await it for the public URL. Dropping the handle leaves the upload
/// running; `abort` stops it and the handle then resolves to
/// `UploadError::Cancelled`.
#[derive(Debug)]
pub struct UploadHandle {
    bucket: String,
    key: String,
    task: JoinHandle<Result<String, UploadError>>,
}

impl UploadHandle {
    pub(crate) fn spawn<F>(bucket: String, key: String, upload: F) -> Self
    where
        F: Future<Output = Result<String, UploadError>> + Send + 'static,
    {
        Self {
            bucket,
            key,
            task: tokio::spawn(upload),
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Future for UploadHandle {
    type Output = Result<String, UploadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(UploadError::Cancelled)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(UploadError::upload(
                &self.bucket,
                &self.key,
                StoreError::Transport(format!("upload task failed: {e}")),
            ))),
        }
    }
}
