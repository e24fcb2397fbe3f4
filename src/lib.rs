//! # Room Presence Library
//!
//! Presence and co-working rooms server:
//! - Clients send a heartbeat every few seconds with their active app
//! - Online status is derived from the last heartbeat, never stored
//! - Visible heartbeats accumulate into an activity log that feeds
//!   per-room statistics (per-member app totals, hourly histograms, top apps)
//! - PostgreSQL for persistent storage, local files for avatars
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: entities, repository traits, presence and aggregation rules
//! - **Application Layer**: services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, avatar storage,
//!   identity provider client, metrics
//! - **Presentation Layer**: HTTP routes, handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! room_presence/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, domain services
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, storage, identity and metrics
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Errors, clock, passwords, validation
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
