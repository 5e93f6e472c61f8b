use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::Error;
use ytlive_common::models::CachedLiveStatus;
use ytlive_common::traits::api::LiveStatusCache;

#[derive(Clone)]
pub struct RedisLiveCache {
    connection: ConnectionManager,
}

impl RedisLiveCache {
    pub async fn connect(redis_url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(redis_url).map_err(cache_err)?;
        let connection = client.get_connection_manager().await.map_err(cache_err)?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

fn cache_err(e: redis::RedisError) -> Error {
    Error::Cache(e.to_string())
}

#[async_trait]
impl LiveStatusCache for RedisLiveCache {
    async fn get_live_status(&self, channel_id: &str) -> Result<Option<CachedLiveStatus>, Error> {
        let mut con = self.connection.clone();
        let key = CachedLiveStatus::cache_key(channel_id);
        let raw: Option<String> = con.get(&key).await.map_err(cache_err)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => {
                debug!("cache miss for {}", key);
                Ok(None)
            }
        }
    }

    async fn set_live_status(
        &self,
        channel_id: &str,
        status: &CachedLiveStatus,
        ttl: Duration,
    ) -> Result<(), Error> {
        let mut con = self.connection.clone();
        let key = CachedLiveStatus::cache_key(channel_id);
        let json = serde_json::to_string(status)?;
        let _: () = con
            .set_ex(&key, json, ttl.as_secs().max(1))
            .await
            .map_err(cache_err)?;
        Ok(())
    }
}
