//! Shared types, errors, and configuration for Tripsplit.
//!
//! This crate provides common types used across all other crates:
//! - Money type backed by integer cents
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Identity (JWT) and email collaborators

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig};
pub use email::{EmailError, EmailService, OutgoingEmail};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
