pub mod args;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod naming;
pub mod source;
pub mod start;
pub mod storage;
pub mod upload;
pub mod utils {
    pub mod log_utils;
    pub mod path_utils;
}

pub use args::Args;
pub use errors::{StoreError, UploadError};
pub use start::run_app;
pub use upload::{ImageUploader, OverwritePolicy, UploadHandle, UploadRequest};
