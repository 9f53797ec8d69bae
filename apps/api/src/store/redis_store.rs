use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{KvStore, StoreError};

/// Redis-backed key space. Every key is stored as `<namespace>:<key>` so the
/// account, area and contact spaces can share one database.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisStore {
    /// Opens a multiplexed connection shared by all clones of the returned store.
    pub async fn connect(redis_url: &str, namespace: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis store connected (namespace: {namespace})");
        Ok(Self::with_connection(conn, namespace))
    }

    /// Reuses an existing connection for another namespace.
    pub fn with_connection(conn: MultiplexedConnection, namespace: &str) -> Self {
        Self {
            conn,
            prefix: format!("{namespace}:"),
        }
    }

    pub fn connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(self.full_key(key), value).await?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let inserted: bool = conn.set_nx(self.full_key(key), value).await?;
        Ok(inserted)
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let mut iter = conn
            .scan_match::<_, String>(format!("{}*", self.prefix))
            .await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(strip_prefix_sorted(keys, &self.prefix))
    }
}

fn strip_prefix_sorted(keys: Vec<String>, prefix: &str) -> Vec<String> {
    let mut stripped: Vec<String> = keys
        .into_iter()
        .filter_map(|k| k.strip_prefix(prefix).map(str::to_string))
        .collect();
    // SCAN order is unspecified and may repeat keys; sort so listings are stable across calls.
    stripped.sort();
    stripped.dedup();
    stripped
}
