use thiserror::Error;

/// Why an object store refused or failed a write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("the resource already exists")]
    AlreadyExists,

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("bucket or object not found: {0}")]
    NotFound(String),

    #[error("rejected by store (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {locator}: {source}")]
    Read {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload of {bucket}/{key} failed: {cause}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        cause: StoreError,
    },

    #[error("upload was cancelled")]
    Cancelled,
}

impl UploadError {
    pub(crate) fn upload(bucket: &str, key: &str, cause: StoreError) -> Self {
        UploadError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            cause,
        }
    }

    /// Human readable reason handed to `UploadCallback::on_failure`.
    pub fn reason(&self) -> String {
        match self {
            UploadError::Read { source, .. } => format!("Failed to read image file: {source}"),
            UploadError::Upload { cause, .. } => format!("Upload failed: {cause}"),
            UploadError::Cancelled => "Upload cancelled".to_string(),
        }
    }

    pub fn is_read_error(&self) -> bool {
        matches!(self, UploadError::Read { .. })
    }

    /// The store-side cause, if the failure happened after reading the source.
    pub fn store_cause(&self) -> Option<&StoreError> {
        match self {
            UploadError::Upload { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("Field missing in config: {0}")]
    MissingField(String),

    #[error("Url parse error: {0}")]
    UrlError(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, UploadError>;
