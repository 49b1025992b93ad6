//! Core types and traits for the Clipper URL shortener.
//!
//! This crate provides the record model, the short code type and the
//! capability traits shared by the storage backends, the caches and the
//! shortening service.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
