//! URL shortening service.
//!
//! This crate provides [`ShortenerService`], which ties a code generator to a
//! repository, plus the configuration and wiring a host process needs to
//! obtain an `Arc<dyn Shortener>`. Core types are re-exported from
//! `clipper_core`.

pub mod bootstrap;
pub mod config;
pub mod service;
pub mod telemetry;

pub use bootstrap::build_service;
pub use clipper_core::{Shortener, ShortenerError};
pub use config::{Settings, StorageBackendArg};
pub use service::ShortenerService;
