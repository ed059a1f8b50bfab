//! Tidewave Core Library
//!
//! This crate provides shared types, errors, configuration, logging and the
//! keyed persistent store for the Tidewave session engine.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;

pub use config::{Config, SeedBookmark};
pub use error::{TidewaveError, TidewaveResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use store::{keys, JsonFileStore, MemoryStore, PersistentStore, StoreExt};
