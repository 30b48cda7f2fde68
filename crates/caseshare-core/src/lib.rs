//! Caseshare Core Library
//!
//! This crate provides the domain models, error types, configuration, filename
//! sanitization and batch validation shared by the Graph client, the HTTP API and
//! the command-line uploader.

pub mod config;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GraphConfig, LibraryConfig, UploadPolicy, UploaderConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use sanitize::{sanitize_filename, sanitize_folder_name, SanitizationResult};
pub use validation::{BatchValidator, NameCollision, ValidationError};
