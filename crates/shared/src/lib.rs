//! Shared types, errors, and configuration for Coffer.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for owners and stored files
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{FileId, OwnerId};
