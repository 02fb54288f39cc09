//! Unified error handling for Tollgate
//!
//! Every failure in the ticket core maps to one of these variants. None of
//! them is fatal: the services either absorb them (entry path) or downgrade
//! them to a "not found" outcome (exit path), logging the variant's code so
//! monitoring can tell a storage outage apart from an unknown ticket.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Lookup Errors ====================
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Invalid ticket id: {0}")]
    InvalidTicketId(String),

    // ==================== Storage Errors ====================
    #[error("Ticket store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Ticket record encoding error: {0}")]
    Encoding(String),

    #[error("Store operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Operation cancelled")]
    Cancelled,

    // ==================== Internal Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code used in logs and by callers
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::TicketNotFound(_) => "ticket_not_found",
            AppError::InvalidTicketId(_) => "invalid_ticket_id",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Encoding(_) => "encoding_error",
            AppError::Timeout(_) => "timeout",
            AppError::Cancelled => "cancelled",
            AppError::Config(_) => "config_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the backing store itself failed (as opposed to the ticket
    /// being unknown or malformed)
    pub fn is_store_fault(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_) | AppError::Timeout(_))
    }

    /// Whether the error means the ticket simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::TicketNotFound(_) | AppError::InvalidTicketId(_)
        )
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Encoding(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidTicketId(err.to_string())
    }
}
