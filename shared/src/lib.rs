//! Shared data models and utilities for the Sklad backend.
//!
//! The `db` feature enables `sqlx::FromRow`/`sqlx::Type` derives on the
//! row types so the inventory engine can map them straight from SQLite.

pub mod models;
pub mod util;
