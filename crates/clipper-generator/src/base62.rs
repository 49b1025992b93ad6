//! Base62 rendering over `0-9a-zA-Z`.

/// Digits, then lowercase, then uppercase.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Renders `value` in base62, most significant digit first.
///
/// Zero renders as `"0"`.
pub fn encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    // u64::MAX needs 11 base62 digits
    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }

    digits.iter().rev().map(|&digit| digit as char).collect()
}

/// Returns `true` if `s` is non-empty and drawn only from [`ALPHABET`].
pub fn is_base62(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
