//! Validation modules

pub mod batch;

pub use batch::{BatchValidator, NameCollision, ValidationError};
