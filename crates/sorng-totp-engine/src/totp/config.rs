//! Engine configuration — step duration, code length, validation window
//! and hash algorithm. Held per engine instance, never global.

use crate::totp::core;
use crate::totp::types::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time-step length: three minutes.
pub const DEFAULT_STEP_SECONDS: u64 = 180;
/// Default code length (modulus 1,000,000).
pub const DEFAULT_DIGITS: u8 = 6;
/// Default number of steps accepted on either side of the current one.
pub const DEFAULT_WINDOW: u32 = 2;

/// Immutable configuration for a [`TotpEngine`](crate::totp::engine::TotpEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Length of one time step in seconds.
    pub step_seconds: u64,
    /// Number of decimal digits in a code.
    pub digits: u8,
    /// Steps checked before and after the current one during validation.
    pub window: u32,
    /// HMAC hash function.
    pub algorithm: Algorithm,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECONDS,
            digits: DEFAULT_DIGITS,
            window: DEFAULT_WINDOW,
            algorithm: Algorithm::Sha1,
        }
    }
}

impl TotpConfig {
    /// Builder: set step duration in seconds.
    pub fn with_step_seconds(mut self, step_seconds: u64) -> Self {
        self.step_seconds = step_seconds;
        self
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: u8) -> Self {
        self.digits = digits;
        self
    }

    /// Builder: set validation window.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TotpError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            TotpError::new(TotpErrorKind::InvalidConfig, "Failed to parse TOTP config")
                .with_detail(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TotpError> {
        if self.step_seconds == 0 {
            return Err(invalid("Step duration must be at least one second")
                .with_detail(format!("step_seconds = {}", self.step_seconds)));
        }
        if i64::try_from(self.step_seconds)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .is_none()
        {
            return Err(invalid("Step duration is too large")
                .with_detail(format!("step_seconds = {}", self.step_seconds)));
        }
        core::code_modulus(self.digits)?;
        Ok(())
    }

    pub fn step(&self) -> Duration {
        Duration::from_secs(self.step_seconds)
    }

    /// Step length in milliseconds. Only meaningful on a validated config.
    pub(crate) fn step_millis(&self) -> i64 {
        (self.step_seconds as i64).saturating_mul(1000)
    }

    /// `10^digits`. Fails with `InvalidConfig` when `digits` is out of range.
    pub fn modulus(&self) -> Result<u32, TotpError> {
        core::code_modulus(self.digits)
    }

    /// Widest clock skew accepted on either side by validation.
    pub fn tolerance(&self) -> Duration {
        self.step().saturating_mul(self.window)
    }
}

fn invalid(msg: impl Into<String>) -> TotpError {
    TotpError::new(TotpErrorKind::InvalidConfig, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TotpConfig::default();
        assert_eq!(c.step(), Duration::from_secs(180));
        assert_eq!(c.digits, 6);
        assert_eq!(c.modulus().unwrap(), 1_000_000);
        assert_eq!(c.window, 2);
        assert_eq!(c.algorithm, Algorithm::Sha1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn default_tolerance_is_six_minutes() {
        assert_eq!(TotpConfig::default().tolerance(), Duration::from_secs(360));
    }

    #[test]
    fn builders() {
        let c = TotpConfig::default()
            .with_step_seconds(30)
            .with_digits(8)
            .with_window(1)
            .with_algorithm(Algorithm::Sha256);
        assert_eq!(c.step_seconds, 30);
        assert_eq!(c.modulus().unwrap(), 100_000_000);
        assert_eq!(c.tolerance(), Duration::from_secs(30));
        assert_eq!(c.step_millis(), 30_000);
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn rejects_zero_step() {
        let err = TotpConfig::default().with_step_seconds(0).validate().unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfig);
    }

    #[test]
    fn rejects_overflowing_step() {
        let err = TotpConfig::default()
            .with_step_seconds(u64::MAX)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfig);
    }

    #[test]
    fn rejects_bad_digits() {
        assert!(TotpConfig::default().with_digits(0).validate().is_err());
        assert!(TotpConfig::default().with_digits(10).validate().is_err());
        assert!(TotpConfig::default().with_digits(1).validate().is_ok());
        assert!(TotpConfig::default().with_digits(9).validate().is_ok());
    }

    #[test]
    fn modulus_rejects_unvalidated_digits() {
        let mut c = TotpConfig::default();
        c.digits = 10;
        assert_eq!(c.modulus().unwrap_err().kind, TotpErrorKind::InvalidConfig);
        c.digits = 0;
        assert_eq!(c.modulus().unwrap_err().kind, TotpErrorKind::InvalidConfig);
    }

    #[test]
    fn zero_window_is_allowed() {
        let c = TotpConfig::default().with_window(0);
        assert!(c.validate().is_ok());
        assert_eq!(c.tolerance(), Duration::ZERO);
    }

    // ── JSON ─────────────────────────────────────────────────────

    #[test]
    fn from_json_partial_uses_defaults() {
        let c = TotpConfig::from_json(r#"{ "step_seconds": 30 }"#).unwrap();
        assert_eq!(c.step_seconds, 30);
        assert_eq!(c.digits, DEFAULT_DIGITS);
        assert_eq!(c.window, DEFAULT_WINDOW);
    }

    #[test]
    fn from_json_full() {
        let c = TotpConfig::from_json(
            r#"{ "step_seconds": 60, "digits": 8, "window": 1, "algorithm": "SHA512" }"#,
        )
        .unwrap();
        let expected = TotpConfig::default()
            .with_step_seconds(60)
            .with_digits(8)
            .with_window(1)
            .with_algorithm(Algorithm::Sha512);
        assert_eq!(c, expected);
    }

    #[test]
    fn from_json_accepts_loose_algorithm_names() {
        let c = TotpConfig::from_json(r#"{ "algorithm": "hmac-sha256" }"#).unwrap();
        assert_eq!(c.algorithm, Algorithm::Sha256);
        let c = TotpConfig::from_json(r#"{ "algorithm": "sha-1" }"#).unwrap();
        assert_eq!(c.algorithm, Algorithm::Sha1);
    }

    #[test]
    fn from_json_rejects_unknown_algorithm() {
        let err = TotpConfig::from_json(r#"{ "algorithm": "md5" }"#).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfig);
        assert!(err.detail.unwrap().contains("md5"));
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = TotpConfig::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfig);
        assert!(err.detail.is_some());
    }

    #[test]
    fn from_json_rejects_invalid_values() {
        let err = TotpConfig::from_json(r#"{ "digits": 12 }"#).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfig);
    }

    #[test]
    fn serde_roundtrip_default() {
        let json = serde_json::to_string(&TotpConfig::default()).unwrap();
        let back = TotpConfig::from_json(&json).unwrap();
        assert_eq!(back, TotpConfig::default());
    }
}
