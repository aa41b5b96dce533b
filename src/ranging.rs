//! Ultrasonic Ranging
//!
//! ## Overview
//!
//! One trigger/echo cycle: pulse the trigger line (low, then high for at
//! least 10 µs, then low), wait for the echo line to go high, and time how
//! long it stays high. The echo wait is bounded at 30 ms - about 5 m of
//! round trip at the speed of sound - so a missing target costs at most one
//! timeout, never a hang. That wait blocks the calling timeline by design;
//! the scheduler stagger in the detector keeps the cost bounded per tick.
//!
//! ## Hardware boundary
//!
//! The core never touches pins. All of the above is owned by whatever
//! implements [`RangingDevice`] - an Arduino-style shim, an `embedded-hal`
//! driver, or a scripted fake in tests. The device reports *echo high-time
//! in microseconds*; [`Ranger`] owns the conversion to distance and the
//! physical envelope check, so fusion logic stays identical across
//! hardware.
//!
//! Echo timeout and out-of-envelope conversions both yield `Ok(None)`:
//! "no object", not an error. Only a genuine hardware fault surfaces as
//! `Err`, and even that is absorbed by the pipeline outside of self-test.

use crate::config::{DetectionConfig, CM_PER_US_ROUND_TRIP};
use crate::errors::RangingResult;

/// Capability supplied by the hardware layer: one full trigger/echo cycle.
///
/// Implementations issue the trigger pulse, then measure how long the echo
/// line stays high, giving up after `timeout_us`:
///
/// - `Ok(Some(us))` - echo observed, high for `us` microseconds
/// - `Ok(None)` - no echo within the timeout (nothing in range)
/// - `Err(_)` - the trigger/echo path itself failed
///
/// One device instance backs one sensor channel. There is no cancellation:
/// once issued, a cycle runs to completion or timeout.
pub trait RangingDevice {
    /// Run one trigger/echo cycle with the given echo timeout.
    fn trigger_and_measure(&mut self, timeout_us: u32) -> RangingResult<Option<u32>>;
}

/// Converts echo timings to distances and enforces the physical envelope.
#[derive(Debug, Clone)]
pub struct Ranger {
    echo_timeout_us: u32,
    min_range_cm: f32,
    max_range_cm: f32,
}

impl Ranger {
    /// Builds a ranger from the detection configuration.
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            echo_timeout_us: config.echo_timeout_us,
            min_range_cm: config.min_range_cm,
            max_range_cm: config.max_range_cm,
        }
    }

    /// Runs one ranging cycle on the given device.
    ///
    /// Returns the measured distance in centimeters, or `None` when the
    /// echo timed out or the conversion fell outside the envelope
    /// (`[min_range_cm, max_range_cm]`). Out-of-envelope results never
    /// reach the caller's history buffer.
    pub fn measure<D: RangingDevice>(&self, device: &mut D) -> RangingResult<Option<f32>> {
        let duration_us = match device.trigger_and_measure(self.echo_timeout_us)? {
            Some(us) => us,
            None => return Ok(None),
        };

        // Round trip to one-way distance.
        let distance_cm = duration_us as f32 * CM_PER_US_ROUND_TRIP / 2.0;

        if distance_cm < self.min_range_cm || distance_cm > self.max_range_cm {
            return Ok(None);
        }

        Ok(Some(distance_cm))
    }
}

impl Default for Ranger {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}
