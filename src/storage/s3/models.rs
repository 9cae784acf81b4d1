use aws_sdk_s3::Client;
use serde::Deserialize;

/// Storage provider type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "provider")]
pub enum S3Provider {
    BackblazeB2,
    CloudflareR2 { account_id: String },
    Custom { endpoint: String, region: String },
}

impl S3Provider {
    pub fn label(&self) -> &'static str {
        match self {
            S3Provider::BackblazeB2 => "Backblaze B2",
            S3Provider::CloudflareR2 { .. } => "Cloudflare R2",
            S3Provider::Custom { .. } => "S3-compatible",
        }
    }
}

/// Configuration for an S3-compatible storage client
pub struct S3Config {
    pub key_id: String,
    pub application_key: String,
    pub provider: S3Provider,
    /// Base for public object URLs. `{bucket}` is substituted when present,
    /// otherwise the bucket is appended as a path segment.
    pub public_base_url: Option<String>,
}

/// Object store backed by an S3-compatible service
pub struct S3Store {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) public_base_url: Option<String>,
    pub(crate) provider: S3Provider,
}
