//! Bird-Signature Gate
//!
//! Heuristic deciding whether a filtered reading plausibly belongs to a
//! moving bird-sized object rather than static background or a glitch.
//! Three rules, checked in order, all must pass:
//!
//! 1. Distance inside the signature band - closer returns are too
//!    small/near to be a bird, farther ones are beyond reliable range.
//! 2. At least `min_motion_cm` of change from the previous raw sample -
//!    a static background return re-reported is not a new detection.
//! 3. At most `max_motion_cm` of change - a bigger single-tick jump is
//!    more likely a different echo entirely than continuous motion.
//!
//! The gate is stateless and evaluated fresh each tick. It establishes no
//! temporal identity; associating a passing reading with an existing track
//! is the detector's job.

use thiserror_no_std::Error;

use crate::config::DetectionConfig;

/// Why a reading failed the signature gate.
///
/// Rejections are expected steady-state behavior (most ticks see only
/// background), so they are never propagated as pipeline errors - the
/// variants exist for diagnostics and tests.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SignatureRejection {
    /// Reading outside the plausible bird range band.
    #[error("distance {distance_cm} cm outside signature band")]
    OutOfBand {
        /// The filtered distance that was evaluated.
        distance_cm: f32,
    },

    /// Too little change from the previous sample - static background.
    #[error("motion {delta_cm} cm below floor")]
    BelowMotionFloor {
        /// Absolute change from the previous raw sample.
        delta_cm: f32,
    },

    /// Too much change in one step - discontinuous, likely a stray echo.
    #[error("motion {delta_cm} cm above ceiling")]
    AboveMotionCeiling {
        /// Absolute change from the previous raw sample.
        delta_cm: f32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SignatureRejection {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfBand { distance_cm } =>
                defmt::write!(fmt, "distance {} cm outside signature band", distance_cm),
            Self::BelowMotionFloor { delta_cm } =>
                defmt::write!(fmt, "motion {} cm below floor", delta_cm),
            Self::AboveMotionCeiling { delta_cm } =>
                defmt::write!(fmt, "motion {} cm above ceiling", delta_cm),
        }
    }
}

/// Stateless signature gate with thresholds lifted from the configuration.
#[derive(Debug, Clone)]
pub struct SignatureGate {
    min_cm: f32,
    max_cm: f32,
    min_motion_cm: f32,
    max_motion_cm: f32,
}

impl SignatureGate {
    /// Builds a gate from the detection configuration.
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_cm: config.signature_min_cm,
            max_cm: config.signature_max_cm,
            min_motion_cm: config.min_motion_cm,
            max_motion_cm: config.max_motion_cm,
        }
    }

    /// Evaluates the gate, reporting which rule rejected the reading.
    pub fn check(
        &self,
        filtered_cm: f32,
        previous_raw_cm: f32,
    ) -> Result<(), SignatureRejection> {
        if filtered_cm < self.min_cm || filtered_cm > self.max_cm {
            return Err(SignatureRejection::OutOfBand { distance_cm: filtered_cm });
        }

        let delta_cm = libm::fabsf(filtered_cm - previous_raw_cm);

        if delta_cm < self.min_motion_cm {
            return Err(SignatureRejection::BelowMotionFloor { delta_cm });
        }
        if delta_cm > self.max_motion_cm {
            return Err(SignatureRejection::AboveMotionCeiling { delta_cm });
        }

        Ok(())
    }

    /// Convenience boolean form of [`check`](Self::check).
    pub fn is_bird_signature(&self, filtered_cm: f32, previous_raw_cm: f32) -> bool {
        self.check(filtered_cm, previous_raw_cm).is_ok()
    }
}

impl Default for SignatureGate {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_moderate_motion_in_band() {
        let gate = SignatureGate::default();
        assert!(gate.is_bird_signature(120.0, 115.0));
    }

    #[test]
    fn rejects_static_background() {
        let gate = SignatureGate::default();
        // 1 cm of change reads as the same static return.
        assert_eq!(
            gate.check(120.0, 119.0),
            Err(SignatureRejection::BelowMotionFloor { delta_cm: 1.0 }),
        );
    }

    #[test]
    fn rejects_discontinuous_jump() {
        let gate = SignatureGate::default();
        assert_eq!(
            gate.check(120.0, 10.0),
            Err(SignatureRejection::AboveMotionCeiling { delta_cm: 110.0 }),
        );
    }

    #[test]
    fn rejects_out_of_band() {
        let gate = SignatureGate::default();
        assert!(matches!(
            gate.check(10.0, 20.0),
            Err(SignatureRejection::OutOfBand { .. }),
        ));
        assert!(matches!(
            gate.check(600.0, 500.0),
            Err(SignatureRejection::OutOfBand { .. }),
        ));
        // The sentinel is far out of band, so an unwarmed channel never
        // produces a detection.
        assert!(!gate.is_bird_signature(9999.0, 9999.0));
    }

    #[test]
    fn band_and_motion_bounds_are_inclusive() {
        let gate = SignatureGate::default();
        assert!(gate.is_bird_signature(15.0, 12.0));
        assert!(gate.is_bird_signature(500.0, 480.0));
        // Exactly 2 cm of motion passes the floor.
        assert!(gate.is_bird_signature(120.0, 118.0));
        // Exactly 100 cm passes the ceiling.
        assert!(gate.is_bird_signature(200.0, 100.0));
    }
}
