//! Redis cache backend.
//!
//! Uses a multiplexed async connection, so one handle serves every
//! in-flight request without pooling. `close` drops the handle's
//! connection; clones taken by calls already in flight finish normally.

use std::time::Duration;

use ::redis::AsyncCommands;
use ::redis::aio::MultiplexedConnection;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::CacheBackend;
use crate::Error;

/// Expiry passed to `SET EX`. Redis rejects zero, so sub-second lifetimes
/// round up to one second.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

pub struct RedisBackend {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisBackend {
    /// Connect to the server at `url`.
    ///
    /// The caller bounds this with its own timeout.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = ::redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn: RwLock::new(Some(conn)) })
    }

    async fn conn(&self) -> Result<MultiplexedConnection, Error> {
        self.conn.read().await.clone().ok_or(Error::CacheClosed)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn kind(&self) -> &'static str {
        "redis"
    }

    async fn probe(&self) -> Result<(), Error> {
        let mut conn = self.conn().await?;
        let reply: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(Error::Cache(format!("unexpected PING reply: {reply}")));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), Error> {
        let mut conn = self.conn().await?;
        let _: () = conn.set_ex(key, value, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn close(&self) {
        if self.conn.write().await.take().is_some() {
            tracing::debug!("redis connection dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIS_URL_VAR: &str = "GLYPH_TEST_REDIS_URL";

    #[test]
    fn test_expiry_has_one_second_floor() {
        assert_eq!(expiry_secs(Duration::ZERO), 1);
        assert_eq!(expiry_secs(Duration::from_millis(300)), 1);
        assert_eq!(expiry_secs(Duration::from_millis(2_900)), 2);
        assert_eq!(expiry_secs(Duration::from_secs(86_400)), 86_400);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        assert!(RedisBackend::connect("redis://127.0.0.1:1").await.is_err());
    }

    #[tokio::test]
    #[ignore = "needs a Redis server in GLYPH_TEST_REDIS_URL"]
    async fn test_live_server_round_trip() {
        let Ok(url) = std::env::var(REDIS_URL_VAR) else {
            eprintln!("{REDIS_URL_VAR} not set, skipping");
            return;
        };
        let backend = RedisBackend::connect(&url).await.unwrap();
        let key = format!("glyph:test:{}", unique_suffix());

        backend.probe().await.unwrap();
        assert_eq!(backend.get(&key).await.unwrap(), None);

        backend.set(&key, b"cached text", Duration::from_secs(60)).await.unwrap();
        assert_eq!(backend.get(&key).await.unwrap().as_deref(), Some(&b"cached text"[..]));

        backend.set(&key, b"short lived", Duration::from_millis(100)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(backend.get(&key).await.unwrap(), None);

        backend.close().await;
        backend.close().await;
        assert!(matches!(backend.probe().await, Err(Error::CacheClosed)));
        assert!(matches!(backend.get(&key).await, Err(Error::CacheClosed)));
        assert!(matches!(backend.set(&key, b"x", Duration::from_secs(1)).await, Err(Error::CacheClosed)));
    }

    fn unique_suffix() -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("{}-{nanos}", std::process::id())
    }
}
