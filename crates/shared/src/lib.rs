//! Shared types, errors, and configuration for Mandi.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Business-ID minting helpers for dealer-scoped sequential identifiers
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
