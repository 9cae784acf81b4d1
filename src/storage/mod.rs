//! Object store backends.

pub mod memory;
pub mod s3;
pub mod supabase;

use crate::config::{BackendConfig, StoreConfig};
use crate::errors::ConfigError;
use crate::interfaces::ObjectStore;
use std::sync::Arc;

pub use memory::{InMemoryStore, StoredObject};
pub use s3::{S3Config, S3Provider, S3Store};
pub use supabase::SupabaseStore;

/// Construct the backend a config describes, resolving its secrets.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, ConfigError> {
    match &config.backend {
        BackendConfig::Supabase { url, api_key } => {
            let key = api_key.resolve()?;
            tracing::info!(%url, "using Supabase storage");
            Ok(Arc::new(SupabaseStore::new(url, key)?))
        }
        BackendConfig::S3 {
            provider,
            access_key_id,
            secret_access_key,
            public_base_url,
        } => {
            let store = S3Store::new(S3Config {
                key_id: access_key_id.resolve()?,
                application_key: secret_access_key.resolve()?,
                provider: provider.clone(),
                public_base_url: public_base_url.clone(),
            });
            tracing::info!(provider = store.provider().label(), endpoint = store.endpoint(), "using S3-compatible storage");
            Ok(Arc::new(store))
        }
        BackendConfig::Memory => {
            tracing::info!("using in-memory storage; nothing leaves this process");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
