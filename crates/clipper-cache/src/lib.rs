//! Caches for URL records and the cache-aside repository decorator.
//!
//! [`CachedRepository`] wraps any [`Repository`](clipper_core::Repository)
//! with any [`UrlCache`](clipper_core::UrlCache). The wrapped repository
//! stays the source of truth; the cache only ever makes reads cheaper.
//!
//! # Example
//!
//! ```rust
//! use clipper_cache::{CacheTtl, CachedRepository, MokaUrlCache};
//! use clipper_storage::InMemoryRepository;
//!
//! let repository = CachedRepository::with_ttl(
//!     InMemoryRepository::new(),
//!     MokaUrlCache::new(),
//!     CacheTtl::from_secs(3600),
//! );
//! assert_eq!(repository.ttl().as_secs(), 3600);
//! ```

pub mod backend;
pub mod entry;
pub mod moka;
pub mod redis;
pub mod repository;
pub mod ttl;

pub use backend::CacheBackend;
pub use clipper_core::{CacheError, UrlCache};
pub use entry::CacheEntry;
pub use self::moka::MokaUrlCache;
pub use self::redis::RedisUrlCache;
pub use repository::CachedRepository;
pub use ttl::CacheTtl;
