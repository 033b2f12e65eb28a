//! The TOTP engine — generates the code for the current time step and
//! validates submitted codes against a window of adjacent steps.
//!
//! The engine is stateless between calls: it owns an immutable
//! [`TotpConfig`] and a [`Clock`], and borrows the secret only for the
//! duration of a single call. One instance can be shared across threads.

use crate::totp::clock::{Clock, SystemClock};
use crate::totp::config::TotpConfig;
use crate::totp::core;
use crate::totp::types::*;

/// RFC 6238 code generator and validator.
#[derive(Debug, Clone)]
pub struct TotpEngine<C: Clock = SystemClock> {
    config: TotpConfig,
    clock: C,
}

impl TotpEngine<SystemClock> {
    /// Engine with the default configuration on the system clock.
    pub fn new() -> Self {
        Self {
            config: TotpConfig::default(),
            clock: SystemClock,
        }
    }

    /// Engine with a custom configuration on the system clock.
    pub fn with_config(config: TotpConfig) -> Result<Self, TotpError> {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for TotpEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TotpEngine<C> {
    /// Engine with a custom configuration and clock.
    pub fn with_clock(config: TotpConfig, clock: C) -> Result<Self, TotpError> {
        if let Err(e) = config.validate() {
            log::warn!("Rejected TOTP config: {e}");
            return Err(e);
        }
        log::debug!(
            "TOTP engine: step={}s digits={} window=±{} algorithm={}",
            config.step_seconds,
            config.digits,
            config.window,
            config.algorithm
        );
        Ok(Self { config, clock })
    }

    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Time steps
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Number of whole steps elapsed since the Unix epoch.
    pub fn current_time_step(&self) -> u64 {
        let now = self.clock.now();
        let step = core::time_step_at(now.timestamp_millis(), self.config.step_millis());
        log::trace!("TOTP time step {step} at {now}");
        step
    }

    /// Seconds until the current code rolls over.
    pub fn seconds_remaining(&self) -> u64 {
        core::seconds_remaining_at(self.clock.now().timestamp(), self.config.step_seconds)
    }

    /// Progress through the current step (0.0 = fresh, 1.0 = about to expire).
    pub fn progress_fraction(&self) -> f64 {
        core::progress_fraction_at(self.clock.now().timestamp(), self.config.step_seconds)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Generation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Code for the current time step.
    pub fn generate_code(
        &self,
        secret: Option<&[u8]>,
        modifier: Option<&str>,
    ) -> Result<u32, TotpError> {
        let secret = secret.ok_or_else(TotpError::missing_secret)?;
        self.compute(secret, self.current_time_step(), modifier)
    }

    /// Same as [`generate_code`](Self::generate_code), with the secret
    /// given as text and encoded as UTF-16LE.
    pub fn generate_code_text(
        &self,
        secret: Option<&str>,
        modifier: Option<&str>,
    ) -> Result<u32, TotpError> {
        let secret = secret.ok_or_else(TotpError::missing_secret)?;
        let bytes = core::encode_utf16le(secret);
        self.generate_code(Some(bytes.as_slice()), modifier)
    }

    /// Code for an explicit time step.
    pub fn generate_code_at(
        &self,
        secret: Option<&[u8]>,
        time_step: u64,
        modifier: Option<&str>,
    ) -> Result<u32, TotpError> {
        let secret = secret.ok_or_else(TotpError::missing_secret)?;
        self.compute(secret, time_step, modifier)
    }

    /// Zero-padded display form of a code under this engine's digit count.
    pub fn format_code(&self, code: u32) -> String {
        core::format_code(code, self.config.digits)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Validation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `true` if `code` matches any step within the window around now.
    pub fn validate_code(
        &self,
        secret: Option<&[u8]>,
        code: u32,
        modifier: Option<&str>,
    ) -> Result<bool, TotpError> {
        Ok(self.verify_code(secret, code, modifier)?.valid)
    }

    /// Same as [`validate_code`](Self::validate_code), with the secret
    /// given as text and encoded as UTF-16LE.
    pub fn validate_code_text(
        &self,
        secret: Option<&str>,
        code: u32,
        modifier: Option<&str>,
    ) -> Result<bool, TotpError> {
        let secret = secret.ok_or_else(TotpError::missing_secret)?;
        let bytes = core::encode_utf16le(secret);
        self.validate_code(Some(bytes.as_slice()), code, modifier)
    }

    /// Check `code` against the window and report which step matched.
    pub fn verify_code(
        &self,
        secret: Option<&[u8]>,
        code: u32,
        modifier: Option<&str>,
    ) -> Result<VerifyResult, TotpError> {
        let secret = secret.ok_or_else(TotpError::missing_secret)?;
        let current = self.current_time_step();
        let window = self.config.window as i64;
        let submitted = code.to_be_bytes();

        for offset in -window..=window {
            let step = core::offset_step(current, offset);
            let expected = self.compute(secret, step, modifier)?;
            if core::constant_time_eq(&expected.to_be_bytes(), &submitted) {
                log::debug!("TOTP code accepted with drift {offset}");
                return Ok(VerifyResult {
                    valid: true,
                    drift: offset,
                    matched_step: Some(step),
                });
            }
        }

        log::debug!("TOTP code rejected within ±{window} steps");
        Ok(VerifyResult::rejected())
    }

    fn compute(&self, secret: &[u8], step: u64, modifier: Option<&str>) -> Result<u32, TotpError> {
        core::compute_code(secret, step, modifier, self.config.algorithm, self.config.digits)
    }
}
