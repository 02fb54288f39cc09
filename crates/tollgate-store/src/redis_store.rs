//! Redis-backed ticket store
//!
//! Each ticket is a single JSON string under `{table}:{id}`, so a write is
//! one `SET` and therefore atomic for that key. Records carry no TTL; tickets
//! are only removed through an explicit `delete`.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use tollgate_core::{models::Ticket, traits::TicketStore, AppError};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::keys;
use crate::record::TicketRecord;

/// Redis ticket store with a multiplexed connection
///
/// Cloning is cheap: the `ConnectionManager` is shared and reconnects on its own.
#[derive(Clone)]
pub struct RedisTicketStore {
    manager: ConnectionManager,
    table: String,
}

impl RedisTicketStore {
    /// Connect to Redis
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `table` - Key namespace for ticket records
    ///
    /// # Errors
    ///
    /// Returns `AppError::StoreUnavailable` if the connection fails
    pub async fn new(url: &str, table: &str) -> Result<Self, AppError> {
        debug!("Connecting to Redis at {}", url);

        let client = Client::open(url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            AppError::StoreUnavailable(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to establish Redis connection: {}", e);
            AppError::StoreUnavailable(format!("Connection failed: {}", e))
        })?;

        debug!("Redis connection established, table {}", table);
        Ok(Self {
            manager,
            table: table.to_string(),
        })
    }

    /// Table (key namespace) this store writes to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Ping the Redis server to check connectivity
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_redis_error)?;
        Ok(())
    }

    /// Remove every record of this store's table
    ///
    /// Only meant for tests against a throwaway Redis.
    #[cfg(test)]
    pub async fn clear(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = conn
            .keys(keys::table_pattern(&self.table))
            .await
            .map_err(Self::map_redis_error)?;
        if !keys.is_empty() {
            let _: () = conn.del(keys).await.map_err(Self::map_redis_error)?;
        }
        Ok(())
    }

    fn key(&self, id: Uuid) -> String {
        keys::ticket_key(&self.table, id)
    }

    /// Convert RedisError to AppError
    fn map_redis_error(err: RedisError) -> AppError {
        match err.kind() {
            redis::ErrorKind::TypeError => {
                warn!("Redis type error: {}", err);
                AppError::Encoding(format!("Type mismatch: {}", err))
            }
            _ => {
                error!("Redis error: {}", err);
                AppError::StoreUnavailable(err.to_string())
            }
        }
    }
}

#[async_trait]
impl TicketStore for RedisTicketStore {
    async fn put(&self, ticket: &Ticket) -> Result<(), AppError> {
        let key = self.key(ticket.id);
        debug!("SET {}", key);

        let json = TicketRecord::from(ticket).to_json().map_err(|e| {
            error!("Failed to encode ticket {}: {}", ticket.id, e);
            e
        })?;

        let mut conn = self.manager.clone();
        let _: () = conn
            .set(&key, json)
            .await
            .map_err(Self::map_redis_error)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let key = self.key(id);
        debug!("GET {}", key);

        let mut conn = self.manager.clone();
        let result: Option<String> = conn.get(&key).await.map_err(Self::map_redis_error)?;

        match result {
            Some(json) => {
                let ticket = TicketRecord::from_json(&json)
                    .and_then(Ticket::try_from)
                    .map_err(|e| {
                        error!("Failed to decode record {}: {}", key, e);
                        e
                    })?;
                Ok(Some(ticket))
            }
            None => {
                debug!("No record for {}", key);
                Ok(None)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let key = self.key(id);
        debug!("DEL {}", key);

        let mut conn = self.manager.clone();
        let deleted: i32 = conn.del(&key).await.map_err(Self::map_redis_error)?;
        if deleted == 0 {
            debug!("DEL {} removed nothing", key);
        }

        Ok(())
    }
}
