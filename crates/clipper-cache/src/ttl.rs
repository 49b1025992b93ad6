use std::time::Duration;

/// Shortest lifetime a cache entry may be given, in seconds.
pub const MIN_TTL_SECS: u64 = 60;
/// Lifetime used when none is configured: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Lifetime of a cache entry, never shorter than [`MIN_TTL_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl(Duration);

impl CacheTtl {
    /// Clamps `secs` up to the floor.
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs.max(MIN_TTL_SECS)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_day() {
        assert_eq!(CacheTtl::default().as_secs(), 86_400);
    }

    #[test]
    fn floor_is_enforced() {
        assert_eq!(CacheTtl::from_secs(0).as_secs(), 60);
        assert_eq!(CacheTtl::from_secs(59).as_secs(), 60);
        assert_eq!(CacheTtl::from_secs(60).as_secs(), 60);
        assert_eq!(CacheTtl::from_secs(61).as_secs(), 61);
    }
}
