//! Core types for the TOTP engine.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hash algorithm used for HMAC-based OTP.
///
/// Serializes as `"SHA1"`/`"SHA256"`/`"SHA512"`; deserializes from any name
/// [`Algorithm::from_str_loose`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_str_loose(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown algorithm: {name}")))
    }
}

impl Algorithm {
    /// Parse from a case-insensitive string.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SHA1" | "SHA-1" | "HMACSHA1" | "HMAC-SHA1" => Some(Self::Sha1),
            "SHA256" | "SHA-256" | "HMACSHA256" | "HMAC-SHA256" => Some(Self::Sha256),
            "SHA512" | "SHA-512" | "HMACSHA512" | "HMAC-SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Modifier
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Domain-separation string mixed into the HMAC input.
///
/// Two modifiers derive independent code sequences from the same secret
/// (e.g. one per purpose). An empty modifier behaves exactly like no
/// modifier at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifier(String);

impl Modifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Strictly decode raw bytes as UTF-8.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, TotpError> {
        std::str::from_utf8(bytes)
            .map(|s| Self(s.to_string()))
            .map_err(|e| {
                TotpError::new(TotpErrorKind::Encoding, "Modifier is not valid UTF-8")
                    .with_detail(e.to_string())
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Modifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Modifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotpErrorKind {
    /// A required argument (the secret) was absent.
    InvalidArgument,
    /// Text input was not valid for its declared encoding.
    Encoding,
    /// Engine configuration is out of range or unparseable.
    InvalidConfig,
    Internal,
}

/// Crate-level error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpError {
    pub kind: TotpErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for TotpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(d) = &self.detail {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for TotpError {}

impl TotpError {
    pub fn new(kind: TotpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn missing_secret() -> Self {
        Self::new(TotpErrorKind::InvalidArgument, "Secret must be provided")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of checking a code against the validation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub valid: bool,
    /// How many time-steps off the match was (0 = exact).
    pub drift: i64,
    /// The time-step number that matched (if any).
    pub matched_step: Option<u64>,
}

impl VerifyResult {
    pub(crate) fn rejected() -> Self {
        Self {
            valid: false,
            drift: 0,
            matched_step: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Algorithm ────────────────────────────────────────────────

    #[test]
    fn algorithm_default_is_sha1() {
        assert_eq!(Algorithm::default(), Algorithm::Sha1);
    }

    #[test]
    fn algorithm_from_str_loose() {
        assert_eq!(Algorithm::from_str_loose("sha1"), Some(Algorithm::Sha1));
        assert_eq!(Algorithm::from_str_loose("HMAC-SHA1"), Some(Algorithm::Sha1));
        assert_eq!(Algorithm::from_str_loose("Sha-256"), Some(Algorithm::Sha256));
        assert_eq!(Algorithm::from_str_loose("hmacsha512"), Some(Algorithm::Sha512));
        assert_eq!(Algorithm::from_str_loose("md5"), None);
    }

    #[test]
    fn algorithm_display_and_serde() {
        assert_eq!(Algorithm::Sha256.to_string(), "SHA256");
        let json = serde_json::to_string(&Algorithm::Sha512).unwrap();
        assert_eq!(json, "\"SHA512\"");
        let back: Algorithm = serde_json::from_str("\"SHA1\"").unwrap();
        assert_eq!(back, Algorithm::Sha1);
        let loose: Algorithm = serde_json::from_str("\"hmac-sha512\"").unwrap();
        assert_eq!(loose, Algorithm::Sha512);
        assert!(serde_json::from_str::<Algorithm>("\"md5\"").is_err());
    }

    // ── Modifier ─────────────────────────────────────────────────

    #[test]
    fn modifier_from_valid_utf8() {
        let m = Modifier::from_utf8("reset-password".as_bytes()).unwrap();
        assert_eq!(m.as_str(), "reset-password");
        assert!(!m.is_empty());
    }

    #[test]
    fn modifier_rejects_invalid_utf8() {
        let err = Modifier::from_utf8(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::Encoding);
        assert!(err.detail.is_some());
    }

    #[test]
    fn modifier_rejects_lone_surrogate_encoding() {
        // CESU-style encoded surrogate half
        let err = Modifier::from_utf8(&[0xed, 0xa0, 0x80]).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::Encoding);
    }

    #[test]
    fn modifier_conversions() {
        let m = Modifier::from("login");
        assert_eq!(m, Modifier::new("login"));
        assert_eq!(m.as_ref(), "login");
    }

    #[test]
    fn empty_modifier() {
        assert!(Modifier::default().is_empty());
        assert!(Modifier::from_utf8(&[]).unwrap().is_empty());
    }

    // ── TotpError ────────────────────────────────────────────────

    #[test]
    fn error_display() {
        let err = TotpError::new(TotpErrorKind::InvalidConfig, "bad step")
            .with_detail("step_seconds = 0");
        let s = err.to_string();
        assert!(s.contains("InvalidConfig"));
        assert!(s.contains("bad step"));
        assert!(s.contains("step_seconds = 0"));
    }

    #[test]
    fn missing_secret_kind() {
        let err = TotpError::missing_secret();
        assert_eq!(err.kind, TotpErrorKind::InvalidArgument);
        assert!(err.detail.is_none());
    }

    #[test]
    fn error_serde() {
        let err = TotpError::new(TotpErrorKind::Encoding, "nope");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"encoding\""));
        let back: TotpError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, TotpErrorKind::Encoding);
    }

    // ── VerifyResult ─────────────────────────────────────────────

    #[test]
    fn rejected_result() {
        let r = VerifyResult::rejected();
        assert!(!r.valid);
        assert_eq!(r.drift, 0);
        assert_eq!(r.matched_step, None);
    }
}
