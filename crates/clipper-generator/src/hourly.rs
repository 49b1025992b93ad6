use crate::base62;
use crate::clock::{Clock, SystemClock};
use crate::Generator;
use clipper_core::ShortCode;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha2::Sha256;
use typed_builder::TypedBuilder;

type HmacSha256 = Hmac<Sha256>;

/// Key used when no application secret is configured.
pub const DEFAULT_SECRET: &str = "clipper-code-secret";

/// Number of digest bytes that make up a code.
const CODE_BYTES: usize = 6;

/// Configures an [`HmacGenerator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct HmacGeneratorSettings {
    /// Application secret keying the HMAC. Changing it changes every code.
    #[builder(default = DEFAULT_SECRET.to_string(), setter(into))]
    pub secret: String,
}

impl Default for HmacGeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Formats the time salt for `now`: the UTC hour as `YYYYMMDDHH`.
pub fn hour_salt(now: Timestamp) -> String {
    now.strftime("%Y%m%d%H").to_string()
}

/// Deterministic generator keyed by an application secret and salted with
/// the current UTC hour.
///
/// Within one hour the same URL always maps to the same code. Across hours
/// the code rotates; previously issued codes are not tracked.
pub struct HmacGenerator<C: Clock = SystemClock> {
    mac: HmacSha256,
    clock: C,
}

impl HmacGenerator<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: HmacGeneratorSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> HmacGenerator<C> {
    pub fn with_clock(settings: HmacGeneratorSettings, clock: C) -> Self {
        // HMAC is defined for keys of any length, so keying cannot fail.
        let mac = HmacSha256::new_from_slice(settings.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        Self { mac, clock }
    }

    /// Returns the clock driving the time salt.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Computes the code for `url` under an explicit time salt.
    pub fn code_for(&self, url: &str, salt: &str) -> ShortCode {
        let mut mac = self.mac.clone();
        mac.update(url.as_bytes());
        mac.update(salt.as_bytes());
        let digest = mac.finalize().into_bytes();

        // little-endian with a zero high part, so the value is never negative
        let mut le_bytes = [0_u8; 8];
        le_bytes[..CODE_BYTES].copy_from_slice(&digest[..CODE_BYTES]);
        let value = u64::from_le_bytes(le_bytes);

        ShortCode::new_unchecked(base62::encode_u64(value))
    }
}

impl<C: Clock> Generator for HmacGenerator<C> {
    fn generate(&self, url: &str) -> ShortCode {
        let salt = hour_salt(self.clock.now());
        self.code_for(url, &salt)
    }
}

impl<C: Clock> std::fmt::Debug for HmacGenerator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base62::is_base62;
    use crate::clock::FixedClock;

    const ARTICLE: &str = "https://example.com/article";

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn generator_at(s: &str) -> (HmacGenerator<FixedClock>, FixedClock) {
        let clock = FixedClock::new(at(s));
        let generator = HmacGenerator::with_clock(HmacGeneratorSettings::default(), clock.clone());
        (generator, clock)
    }

    #[test]
    fn salt_is_utc_hour() {
        assert_eq!(hour_salt(at("2024-06-15T13:42:07Z")), "2024061513");
        assert_eq!(hour_salt(at("2024-01-02T03:00:00Z")), "2024010203");
        // offsets are normalised to UTC
        assert_eq!(hour_salt(at("2024-06-15T23:30:00-02:00")), "2024061601");
    }

    #[test]
    fn known_code() {
        let (generator, _) = generator_at("2024-06-15T13:05:00Z");
        assert_eq!(generator.generate(ARTICLE).as_str(), "GCORf76Q");
        assert_eq!(generator.code_for(ARTICLE, "2024061514").as_str(), "jNK7ziWu");
    }

    #[test]
    fn stable_within_the_hour() {
        let (generator, clock) = generator_at("2024-06-15T13:00:00Z");
        let first = generator.generate(ARTICLE);
        clock.set(at("2024-06-15T13:59:59Z"));
        let second = generator.generate(ARTICLE);
        assert_eq!(first, second);
    }

    #[test]
    fn rotates_across_hours() {
        let (generator, clock) = generator_at("2024-06-15T13:00:00Z");
        let first = generator.generate(ARTICLE);
        clock.set(at("2024-06-15T14:00:00Z"));
        let second = generator.generate(ARTICLE);
        clock.set(at("2024-06-16T13:00:00Z"));
        let third = generator.generate(ARTICLE);
        assert_ne!(first, second);
        assert_ne!(first, third);
        assert_ne!(second, third);
    }

    #[test]
    fn empty_url_is_deterministic() {
        let (generator, _) = generator_at("2024-06-15T13:00:00Z");
        let code = generator.generate("");
        assert_eq!(code.as_str(), "CJmPTOgz");
        assert_eq!(generator.generate(""), code);
    }

    #[test]
    fn secret_changes_codes() {
        let clock = FixedClock::new(at("2024-06-15T13:00:00Z"));
        let default = HmacGenerator::with_clock(HmacGeneratorSettings::default(), clock.clone());
        let other = HmacGenerator::with_clock(
            HmacGeneratorSettings::builder().secret("another-secret").build(),
            clock,
        );
        assert_ne!(default.generate(ARTICLE), other.generate(ARTICLE));
    }

    #[test]
    fn codes_stay_in_alphabet() {
        let (generator, _) = generator_at("2024-06-15T13:00:00Z");
        for i in 0..500 {
            let url = format!("https://example.com/{i}?q={}", i * 7);
            let code = generator.generate(&url);
            assert!(is_base62(code.as_str()), "unexpected code {code}");
            // 48 bits fit in at most 9 base62 digits
            assert!(code.as_str().len() <= 9);
        }
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let (generator, _) = generator_at("2024-06-15T13:00:00Z");
        let rendered = format!("{generator:?}");
        assert!(!rendered.contains(DEFAULT_SECRET));
    }
}
