//! Ticket store backends for Tollgate
//!
//! Implements the `TicketStore` trait from tollgate-core twice:
//!
//! - [`MemoryTicketStore`] keeps tickets in a process-local map. Used by
//!   tests and local runs.
//! - [`RedisTicketStore`] keeps each ticket as a JSON document in Redis,
//!   namespaced by the configured table name.
//!
//! Backend wire shapes stay inside this crate; callers only ever see
//! `Ticket`.
//!
//! # Example
//!
//! ```no_run
//! use tollgate_store::RedisTicketStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RedisTicketStore::new("redis://127.0.0.1:6379", "parkingTickets").await?;
//!     store.ping().await?;
//!     Ok(())
//! }
//! ```

pub mod keys;
pub mod memory;
pub mod record;
pub mod redis_store;

pub use memory::MemoryTicketStore;
pub use record::TicketRecord;
pub use redis_store::RedisTicketStore;
