//! Error Types for the Ranging Boundary
//!
//! The detection pipeline itself never fails: a bad reading, an echo
//! timeout, or a full track pool all degrade to "no detection this tick"
//! and the control loop keeps running. The only errors in this crate live
//! at the hardware boundary, where a ranging device can genuinely be
//! broken rather than merely quiet.
//!
//! The distinction matters for callers:
//!
//! - `Ok(None)` from a device means "no echo" — a transient condition the
//!   pipeline absorbs silently.
//! - `Err(RangingError)` means the trigger/echo path itself misbehaved.
//!   The pipeline still absorbs it (the channel contributes nothing this
//!   tick), but the self-test surfaces it as a diagnostic failure.
//!
//! Errors are kept `Copy` with inline `&'static str` reasons only - no
//! heap, deterministic size, safe to return from hot paths.

use thiserror_no_std::Error;

/// Result type for ranging-device operations.
pub type RangingResult<T> = Result<T, RangingError>;

/// Hardware-level fault on a ranging channel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingError {
    /// The device did not respond to the trigger at all (wiring fault,
    /// dead transducer, bus problem).
    #[error("ranging device fault: {reason}")]
    DeviceFault {
        /// Short diagnosis supplied by the hardware driver.
        reason: &'static str,
    },

    /// The echo line was already high when the trigger was issued and
    /// never fell - a stuck receiver, not an absent target.
    #[error("echo line stuck high")]
    EchoStuckHigh,
}

#[cfg(feature = "defmt")]
impl defmt::Format for RangingError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DeviceFault { reason } =>
                defmt::write!(fmt, "ranging device fault: {}", reason),
            Self::EchoStuckHigh =>
                defmt::write!(fmt, "echo line stuck high"),
        }
    }
}
