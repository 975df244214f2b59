//! # lampctl-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept commands as JSON (`POST /api/commands`) and run them in the
//!   background, one at a time
//! - Serve the static web front end from a directory, when configured
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `lampctl-app` (for port traits and services) and `lampctl-domain`
//! (for error types used in response mapping). Never leaks axum types
//! into the domain.

pub mod api;
mod error;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
