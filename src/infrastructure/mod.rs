//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database pool and repositories (PostgreSQL)
//! - Avatar file storage (local filesystem)
//! - Identity provider client (Google)
//! - Prometheus metrics

pub mod database;
pub mod identity;
pub mod metrics;
pub mod repositories;
pub mod storage;
