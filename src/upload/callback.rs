use crate::interfaces::UploadCallback;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(String),
    Failure(String),
}

/// Forwards the outcome to a channel so the caller's own thread observes it.
#[derive(Debug, Clone)]
pub struct ChannelCallback {
    tx: Sender<UploadOutcome>,
}

impl ChannelCallback {
    pub fn new(tx: Sender<UploadOutcome>) -> Self {
        Self { tx }
    }
}

impl UploadCallback for ChannelCallback {
    fn on_success(&self, public_url: String) {
        if self.tx.send(UploadOutcome::Success(public_url)).is_err() {
            tracing::debug!("upload finished after its receiver went away");
        }
    }

    fn on_failure(&self, reason: String) {
        if self.tx.send(UploadOutcome::Failure(reason)).is_err() {
            tracing::debug!("upload failed after its receiver went away");
        }
    }
}
