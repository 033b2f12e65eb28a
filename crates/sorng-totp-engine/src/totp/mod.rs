//! TOTP engine: sub-modules.

pub mod types;
pub mod config;
pub mod clock;
pub(crate) mod core;
pub mod engine;

// Re-export top-level items for convenience.
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TotpConfig;
pub use self::core::hotp;
pub use engine::TotpEngine;
pub use types::*;
