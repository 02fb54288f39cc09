//! Key builders for ticket records
//!
//! Every record lives under `{table}:{ticket_id}`. The table name comes from
//! configuration so several deployments can share one Redis instance.
//!
//! # Example
//!
//! ```
//! use tollgate_store::keys;
//! use uuid::Uuid;
//!
//! let id = Uuid::nil();
//! assert_eq!(
//!     keys::ticket_key("parkingTickets", id),
//!     "parkingTickets:00000000-0000-0000-0000-000000000000"
//! );
//! ```

use uuid::Uuid;

/// Separator between the table name and the ticket id
pub const KEY_SEPARATOR: char = ':';

/// Build the key for a ticket record
pub fn ticket_key(table: &str, id: Uuid) -> String {
    format!("{}{}{}", table, KEY_SEPARATOR, id)
}

/// Build the pattern matching every record of a table
pub fn table_pattern(table: &str) -> String {
    format!("{}{}*", table, KEY_SEPARATOR)
}
