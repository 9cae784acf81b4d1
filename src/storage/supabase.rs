use crate::errors::{ConfigError, StoreError};
use crate::interfaces::ObjectStore;
use crate::upload::OverwritePolicy;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

const OBJECT_PATH: [&str; 3] = ["storage", "v1", "object"];
const PUBLIC_PATH: [&str; 4] = ["storage", "v1", "object", "public"];

/// Supabase Storage over its REST API.
pub struct SupabaseStore {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

/// Error body returned by the storage API, e.g.
/// `{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageErrorBody {
    #[serde(default)]
    status_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SupabaseStore {
    pub fn new(project_url: &str, api_key: String) -> Result<Self, ConfigError> {
        let base = Url::parse(project_url)
            .map_err(|e| ConfigError::UrlError(format!("{project_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::UrlError(format!(
                "{project_url}: not a base URL"
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            api_key,
        })
    }

    fn object_url(&self, prefix: &[&str], bucket: &str, key: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(prefix.iter().copied());
            path.push(bucket);
            path.extend(key.split('/'));
        }
        url
    }
}

/// Map a non-success storage API response to a `StoreError`.
pub(crate) fn classify_response(status: StatusCode, body: &str) -> StoreError {
    let parsed: StorageErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .unwrap_or_else(|| body.trim().to_string());

    // the API reports conflicts as 400 with the real code in the body
    let body_code = parsed
        .status_code
        .as_deref()
        .and_then(|c| c.parse::<u16>().ok());
    let duplicate = parsed.error.as_deref() == Some("Duplicate")
        || message.contains("already exists");

    match (status.as_u16(), body_code) {
        (409, _) | (_, Some(409)) => StoreError::AlreadyExists,
        (400, _) if duplicate => StoreError::AlreadyExists,
        (401, _) | (403, _) | (_, Some(401)) | (_, Some(403)) => StoreError::Unauthorized(message),
        (404, _) | (_, Some(404)) => StoreError::NotFound(message),
        (code, _) => StoreError::Rejected {
            status: code,
            message,
        },
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: OverwritePolicy,
    ) -> Result<(), StoreError> {
        let url = self.object_url(&OBJECT_PATH, bucket, key);
        let upsert = overwrite == OverwritePolicy::Overwrite;
        tracing::debug!(%url, upsert, size = bytes.len(), "uploading to supabase storage");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %body, "supabase storage rejected upload");
        Err(classify_response(status, &body))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.object_url(&PUBLIC_PATH, bucket, key).to_string()
    }
}
