//! # SortOfRemote NG – TOTP Engine
//!
//! Stateless time-based one-time password primitive:
//!
//! - **RFC 4226 / 6238** – HOTP dynamic truncation over a time-step counter,
//!   HMAC-SHA1 by default (SHA-256 / SHA-512 selectable)
//! - **Modifiers** – optional domain-separation string appended to the
//!   counter, deriving independent code sequences from one secret
//! - **Drift window** – validation accepts codes from adjacent time steps
//!   (three-minute steps, ±2 steps by default)
//! - **Injectable clock** – [`FixedClock`] freezes time for deterministic tests
//!
//! ```no_run
//! use sorng_totp_engine::TotpEngine;
//!
//! let engine = TotpEngine::new();
//! let secret = b"shared secret";
//! let code = engine.generate_code(Some(secret), None)?;
//! assert!(engine.validate_code(Some(secret), code, None)?);
//! # Ok::<(), sorng_totp_engine::TotpError>(())
//! ```

pub mod totp;

pub use totp::{
    hotp, Algorithm, Clock, FixedClock, Modifier, SystemClock, TotpConfig, TotpEngine, TotpError,
    TotpErrorKind, VerifyResult,
};
