//! Bookshelf application library
//!
//! The books module, its stores, and the wiring that runs them behind the
//! HTTP server.

pub mod app;
pub mod modules;

pub use app::{build_registry, migrate, serve, Backend};
