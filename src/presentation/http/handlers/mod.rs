//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod debug;
pub mod health;
pub mod presence;
pub mod room;
pub mod stats;
pub mod user;
