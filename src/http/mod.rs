//! HTTP API
//!
//! JSON routes over the application services. Errors are always
//! `{"error": "..."}` bodies.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{router, serve, AppState, Ports, ServerOptions};
