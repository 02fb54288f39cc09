//! Tollgate Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Tollgate parking ticket system. It includes:
//!
//! - The `Ticket` domain model and its status lifecycle
//! - Capability traits consumed by the services (store, clock, id generator)
//! - Unified error handling with stable error codes
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
