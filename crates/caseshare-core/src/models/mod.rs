//! Data models for the application
//!
//! Domain values exchanged between the Graph layer, the HTTP API and the client,
//! plus the request/response bodies of the public API.

mod batch;
mod drive;
mod folder;
mod upload;

pub use batch::*;
pub use drive::*;
pub use folder::*;
pub use upload::*;
