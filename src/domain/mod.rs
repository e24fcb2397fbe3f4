//! # Domain Layer
//!
//! The presence and activity model of the server, independent of HTTP and
//! storage concerns.
//!
//! ## Structure
//!
//! - **entities**: users, rooms, liveness records, activity log, and the
//!   repository/collaborator traits that persist them
//! - **value_objects**: room codes, statistics periods and time windows
//! - **services**: the presence engine and the activity aggregation engine

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
