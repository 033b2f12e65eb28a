//! Core OTP primitives — RFC 4226 (HOTP) and RFC 6238 (TOTP).
//!
//! Counter encoding, keyed hashing, dynamic truncation and time-step
//! arithmetic. Everything here is a pure function; the engine supplies the
//! clock and configuration.

use crate::totp::types::*;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

/// Largest code length whose modulus still fits a `u32`.
pub const MAX_DIGITS: u8 = 9;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Raw HMAC-OTP (RFC 4226 §5.3)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute the OTP for `time_step`, optionally domain-separated by
/// `modifier`. Returns the numeric code, `< 10^digits`.
pub fn compute_code(
    secret: &[u8],
    time_step: u64,
    modifier: Option<&str>,
    algo: Algorithm,
    digits: u8,
) -> Result<u32, TotpError> {
    let modulus = code_modulus(digits)?;
    let message = counter_message(time_step, modifier);
    let digest = compute_hmac(secret, &message, algo)?;
    debug_assert_eq!(digest.len(), algo.digest_len());
    Ok(truncate(&digest, modulus))
}

/// Plain HOTP-SHA1 (no modifier), as in RFC 4226 Appendix D.
pub fn hotp(secret: &[u8], counter: u64, digits: u8) -> Result<u32, TotpError> {
    compute_code(secret, counter, None, Algorithm::Sha1, digits)
}

/// `10^digits`, for code lengths of 1 through [`MAX_DIGITS`].
pub fn code_modulus(digits: u8) -> Result<u32, TotpError> {
    if digits == 0 || digits > MAX_DIGITS {
        return Err(TotpError::new(
            TotpErrorKind::InvalidConfig,
            format!("Digits must be between 1 and {}", MAX_DIGITS),
        )
        .with_detail(format!("digits = {}", digits)));
    }
    Ok(10u32.pow(digits as u32))
}

/// HMAC input: the counter as a big-endian signed 64-bit integer, then the
/// modifier's UTF-8 bytes if it is non-empty.
pub fn counter_message(time_step: u64, modifier: Option<&str>) -> Vec<u8> {
    let suffix = modifier.unwrap_or_default().as_bytes();
    let mut message = Vec::with_capacity(8 + suffix.len());
    // Two's-complement reinterpretation, not a clamp.
    message.extend_from_slice(&(time_step as i64).to_be_bytes());
    message.extend_from_slice(suffix);
    message
}

/// Compute HMAC(key, message) using the specified algorithm.
fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Result<Vec<u8>, TotpError> {
    match algo {
        Algorithm::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key).map_err(key_rejected)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(key_rejected)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Sha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(key_rejected)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

fn key_rejected(e: hmac::digest::InvalidLength) -> TotpError {
    TotpError::new(TotpErrorKind::Internal, "HMAC rejected the key").with_detail(e.to_string())
}

/// Dynamic truncation per RFC 4226 §5.3.
fn truncate(hmac_result: &[u8], modulus: u32) -> u32 {
    let offset = (hmac_result[hmac_result.len() - 1] & 0x0f) as usize;
    debug_assert!(offset + 4 <= hmac_result.len(), "truncation offset out of range");
    let binary = ((hmac_result[offset] as u32 & 0x7f) << 24)
        | ((hmac_result[offset + 1] as u32) << 16)
        | ((hmac_result[offset + 2] as u32) << 8)
        | (hmac_result[offset + 3] as u32);
    binary % modulus
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Time steps (RFC 6238)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Time-step number for a millisecond unix timestamp.
///
/// Division truncates toward zero and the result is reinterpreted as
/// unsigned, so instants before the epoch wrap. `step_millis` must be
/// positive; the engine only passes validated step lengths.
pub fn time_step_at(unix_millis: i64, step_millis: i64) -> u64 {
    debug_assert!(step_millis > 0, "step length must be positive");
    (unix_millis / step_millis) as u64
}

/// Step `offset` steps away from `base`, using signed arithmetic.
pub fn offset_step(base: u64, offset: i64) -> u64 {
    (base as i64).wrapping_add(offset) as u64
}

/// Seconds remaining until the step containing `unix_seconds` expires.
pub fn seconds_remaining_at(unix_seconds: i64, step_seconds: u64) -> u64 {
    let step = step_seconds as i64;
    (step - unix_seconds.rem_euclid(step)) as u64
}

/// Progress fraction (0.0 = fresh code, 1.0 = about to expire).
pub fn progress_fraction_at(unix_seconds: i64, step_seconds: u64) -> f64 {
    let step = step_seconds as i64;
    unix_seconds.rem_euclid(step) as f64 / step as f64
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Utility helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// UTF-16 little-endian bytes of `text`, without a byte-order mark.
/// The buffer is wiped when dropped.
pub fn encode_utf16le(text: &str) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(text.len() * 2));
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Constant-time comparison (to prevent timing attacks on code verification).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Zero-padded display form of a code (e.g. `42` → `"000042"`).
pub fn format_code(code: u32, digits: u8) -> String {
    format!("{:0>width$}", code, width = digits as usize)
}
