//! Short code generation.
//!
//! Codes are derived from the URL itself and a coarse time salt, so the
//! generator needs no storage round trip and no shared counter.

pub mod base62;
mod clock;
mod hourly;

pub use clock::{Clock, FixedClock, SystemClock};
pub use hourly::{hour_salt, HmacGenerator, HmacGeneratorSettings, DEFAULT_SECRET};

use clipper_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// The same URL may map to the same code, which is how the shortening
/// service deduplicates requests.
pub trait Generator: Send + Sync + 'static {
    /// Derives the short code for `url`.
    fn generate(&self, url: &str) -> ShortCode;
}
