//! Key-value lookup service.
//!
//! Every record the service reads or writes lives behind [`KvStore`], a plain
//! get / put / list-keys contract. [`Table`] layers JSON (de)serialization on
//! top so callers work with typed records instead of raw strings.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod memory;
pub mod redis_store;
pub mod seed;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Logical namespaces. Each one is an independent key space.
pub const ACCOUNT_NAMESPACE: &str = "account";
pub const AREA_NAMESPACE: &str = "area";
pub const CONTACT_NAMESPACE: &str = "contact";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Record '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single key space of string values.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Writes `value` only if `key` is unset. Returns `false` when the key
    /// already existed; the check and the write are one atomic step.
    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError>;

    /// All keys currently in this key space.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Typed view over a [`KvStore`], storing `T` as JSON.
pub struct Table<T> {
    store: Arc<dyn KvStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub async fn put(&self, key: &str, record: &T) -> Result<(), StoreError> {
        let raw = encode(key, record)?;
        self.store.put(key, raw).await
    }

    /// Inserts `record` unless `key` is taken. Returns `false` if it was.
    pub async fn insert_new(&self, key: &str, record: &T) -> Result<bool, StoreError> {
        let raw = encode(key, record)?;
        self.store.put_if_absent(key, raw).await
    }

    pub async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.store.list().await
    }
}

fn encode<T: Serialize>(key: &str, record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}
