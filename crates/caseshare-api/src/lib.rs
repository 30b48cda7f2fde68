//! Caseshare API Library
//!
//! HTTP handlers, error rendering and application setup for the case upload service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{HttpAppError, ValidatedJson};
pub use state::AppState;
