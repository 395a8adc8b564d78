//! Common library for the asset services
//!
//! Shared PostgreSQL connectivity, schema migrations and error types used by
//! the services in this workspace.

pub mod database;
pub mod error;
