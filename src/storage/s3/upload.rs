use crate::errors::StoreError;
use crate::interfaces::ObjectStore;
use crate::storage::s3::models::S3Store;
use crate::upload::OverwritePolicy;
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use reqwest::Url;

/// Map an S3 failure, described by HTTP status and error code, to a `StoreError`.
///
/// A missing status means the request never got a response.
pub(crate) fn classify_failure(status: Option<u16>, code: Option<&str>, message: String) -> StoreError {
    match (status, code) {
        (_, Some("PreconditionFailed")) | (Some(412), _) => StoreError::AlreadyExists,
        // concurrent conditional writes to the same key
        (_, Some("ConditionalRequestConflict")) => StoreError::AlreadyExists,
        (_, Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"))
        | (Some(401 | 403), _) => StoreError::Unauthorized(message),
        (_, Some("NoSuchBucket")) | (Some(404), _) => StoreError::NotFound(message),
        (Some(status), _) => StoreError::Rejected { status, message },
        (None, _) => StoreError::Transport(message),
    }
}

fn classify_put_error(err: &SdkError<PutObjectError>) -> StoreError {
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.as_service_error().and_then(|e| e.code());
    let message = match err.as_service_error().and_then(|e| e.message()) {
        Some(m) => m.to_string(),
        None => format!("{}", DisplayErrorContext(err)),
    };
    classify_failure(status, code, message)
}

/// Append `segments` to `base` as percent-encoded path segments.
///
/// Falls back to plain joining when `base` is not a usable URL.
fn join_object_path<'a>(base: &str, segments: impl Iterator<Item = &'a str>) -> String {
    match Url::parse(base) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty();
                path.extend(segments);
            }
            url.to_string()
        }
        _ => {
            let mut joined = base.trim_end_matches('/').to_string();
            for segment in segments {
                joined.push('/');
                joined.push_str(segment);
            }
            joined
        }
    }
}

impl S3Store {
    pub(crate) fn build_public_url(&self, bucket: &str, key: &str) -> String {
        let key_segments = key.split('/');
        match &self.public_base_url {
            Some(base) if base.contains("{bucket}") => {
                join_object_path(&base.replace("{bucket}", bucket), key_segments)
            }
            Some(base) => join_object_path(base, std::iter::once(bucket).chain(key_segments)),
            None => join_object_path(&self.endpoint, std::iter::once(bucket).chain(key_segments)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: OverwritePolicy,
    ) -> Result<(), StoreError> {
        tracing::debug!(
            provider = self.provider.label(),
            bucket,
            key,
            size = bytes.len(),
            ?overwrite,
            "put_object"
        );

        let mut put_request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes));

        // create-if-absent; the store decides atomically
        if overwrite == OverwritePolicy::Reject {
            put_request = put_request.if_none_match("*");
        }

        let response = put_request.send().await.map_err(|e| {
            let classified = classify_put_error(&e);
            tracing::debug!(error = %DisplayErrorContext(&e), "put_object failed");
            classified
        })?;

        if let Some(etag) = response.e_tag() {
            tracing::debug!(etag = etag.replace('"', ""), "stored object");
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.build_public_url(bucket, key)
    }
}
