//! Detection and tracking core for a perimeter bird-deterrence device
//!
//! Ranges nearby objects with three ultrasonic sensors, median-filters the
//! raw readings, gates them through a bird-signature heuristic, and tracks
//! confirmed objects across time in a fixed pool of slots. Deterrent
//! controllers (audio, strobe, power) consume the tracker's outputs: active
//! count, closest distance, per-track velocity.
//!
//! Key constraints:
//! - Runs on small MCUs (ESP32 class), no heap allocation
//! - Single cooperative timeline, one `update()` per scheduler tick
//! - A misbehaving sensor degrades detection, it never halts it
//!
//! ```no_run
//! use perchguard::{BirdDetector, RangingDevice, RangingResult};
//! use perchguard::time::SystemTime;
//!
//! struct Hcsr04; // wraps the real trigger/echo pins
//!
//! impl RangingDevice for Hcsr04 {
//!     fn trigger_and_measure(&mut self, _timeout_us: u32) -> RangingResult<Option<u32>> {
//!         Ok(None) // drive the hardware here
//!     }
//! }
//!
//! let mut detector = BirdDetector::new([Hcsr04, Hcsr04, Hcsr04], SystemTime);
//! loop {
//!     detector.update();
//!     if detector.is_object_detected(250.0) {
//!         // wake the deterrent controllers
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod config;
pub mod detector;
pub mod errors;
pub mod filter;
pub mod ranging;
pub mod signature;
pub mod time;
pub mod track;

// Public API
pub use config::DetectionConfig;
pub use detector::BirdDetector;
pub use errors::{RangingError, RangingResult};
pub use ranging::RangingDevice;
pub use signature::SignatureGate;
pub use time::{TimeSource, Timestamp};
pub use track::TrackView;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
