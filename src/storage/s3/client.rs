use crate::storage::s3::models::{S3Config, S3Provider, S3Store};
use aws_config::retry::RetryConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Region};

impl S3Store {
    /// Create a new S3-compatible client from the provided config
    pub fn new(config: S3Config) -> Self {
        let (endpoint, region) = match &config.provider {
            S3Provider::BackblazeB2 => (
                "https://s3.us-west-004.backblazeb2.com".to_string(),
                Region::new("us-west-004"),
            ),
            S3Provider::CloudflareR2 { account_id } => (
                format!("https://{}.r2.cloudflarestorage.com", account_id),
                Region::new("auto"),
            ),
            S3Provider::Custom { endpoint, region } => (
                endpoint.trim_end_matches('/').to_string(),
                Region::new(region.clone()),
            ),
        };

        tracing::debug!(
            provider = config.provider.label(),
            %endpoint,
            key_id = %format!("{}****", config.key_id.chars().take(4).collect::<String>()),
            "creating S3-compatible client"
        );

        let credentials = Credentials::new(
            config.key_id,
            config.application_key,
            None, // No session token
            None, // No expiry
            "MeduploadStaticCredentials",
        );

        // one best-effort attempt per upload
        let s3_config = aws_sdk_s3::Config::builder()
            .region(region)
            .endpoint_url(endpoint.clone())
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .force_path_style(true)
            .behavior_version(BehaviorVersion::latest())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            endpoint,
            public_base_url: config.public_base_url,
            provider: config.provider,
        }
    }

    /// Get the provider type
    pub fn provider(&self) -> &S3Provider {
        &self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
