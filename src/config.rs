//! Tunables and Named Constants for the Detection Core
//!
//! Every numeric value used by the detection pipeline is defined here, either
//! as a compile-time capacity (array sizes the type system depends on) or as
//! a field of [`DetectionConfig`] (thresholds a deployment may tune without
//! touching pipeline code).
//!
//! ## Capacities vs. thresholds
//!
//! Capacities are `const` because they size fixed arrays: changing them is a
//! rebuild, never a runtime decision. That preserves the bounded-memory
//! guarantee the rest of the crate is built on. Thresholds live in
//! [`DetectionConfig`] so a unit mounted on a different perimeter (longer
//! sightlines, different sensor geometry) ships the same binary layout with
//! different numbers.
//!
//! ## Usage guidelines
//!
//! 1. Always use these names instead of magic numbers
//! 2. New constants get documentation with units and rationale
//! 3. Names include units (`_cm`, `_ms`, `_deg`) wherever a unit applies

/// Number of ultrasonic sensor channels, fixed at construction.
///
/// The reference unit carries three HC-SR04 class sensors facing
/// front/left/right. Each channel owns its own history buffer and poll
/// schedule.
pub const SENSOR_COUNT: usize = 3;

/// Capacity of the track pool.
///
/// At most this many simultaneous object hypotheses are held; a genuinely
/// new object beyond this count is dropped or displaces the weakest track
/// (see the detector's eviction rule).
pub const MAX_TRACKS: usize = 10;

/// Depth of each channel's raw-distance ring buffer.
pub const HISTORY_DEPTH: usize = 10;

/// Number of most-recent samples the median filter looks at.
///
/// Must be odd (the filter returns the middle element) and no larger than
/// [`HISTORY_DEPTH`].
pub const FILTER_WINDOW: usize = 5;

/// Sentinel distance meaning "no valid target" (cm).
///
/// History slots are initialized to this value before the first write, and
/// aggregate queries return it when no track qualifies. Chosen well outside
/// any physically reachable range.
pub const NO_TARGET_CM: f32 = 9999.0;

/// Speed-of-sound conversion factor: centimeters per microsecond of
/// round-trip echo time. Divide the product by 2 for one-way distance.
///
/// 343 m/s at 20 °C works out to 0.0343 cm/µs; the sensor datasheet's
/// conventional 0.034 is kept so readings line up with bench calibration.
pub const CM_PER_US_ROUND_TRIP: f32 = 0.034;

/// Upper bound of a track's confidence score.
pub const CONFIDENCE_MAX: u8 = 100;

/// Centimeters per meter, for velocity unit conversion.
pub const CM_PER_METER: f32 = 100.0;

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Runtime-tunable thresholds for the detection pipeline.
///
/// The defaults reproduce the reference deployment. Construct with
/// `DetectionConfig::default()` and override fields as needed:
///
/// ```
/// use perchguard::DetectionConfig;
///
/// let config = DetectionConfig {
///     max_range_cm: 300.0, // shorter perimeter
///     ..DetectionConfig::default()
/// };
/// # let _ = config;
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionConfig {
    /// Minimum physically credible range (cm). Readings below are discarded
    /// before they reach the filter.
    pub min_range_cm: f32,

    /// Maximum reliable sensor range (cm). Readings beyond are discarded.
    pub max_range_cm: f32,

    /// Echo wait timeout (µs). 30 ms covers roughly 5 m of round trip at
    /// the speed of sound; waiting longer only blocks the timeline.
    pub echo_timeout_us: u32,

    /// Base minimum gap between polls of the same channel (ms).
    pub poll_base_ms: u64,

    /// Extra per-channel gap, multiplied by the channel index (ms).
    ///
    /// Staggering the channels keeps two sensors from firing close together
    /// and picking up each other's echoes (acoustic crosstalk).
    pub poll_stagger_ms: u64,

    /// Minimum gap between association/lifecycle passes (ms). Tracking is
    /// not recomputed faster than new readings can materially change it.
    pub tracking_interval_ms: u64,

    /// Lower bound of the bird-signature range band (cm). Closer returns
    /// are too small/near to be a bird.
    pub signature_min_cm: f32,

    /// Upper bound of the bird-signature range band (cm).
    pub signature_max_cm: f32,

    /// Minimum sample-to-sample motion (cm) for a reading to count as a
    /// moving object rather than static background.
    pub min_motion_cm: f32,

    /// Maximum sample-to-sample motion (cm); a larger jump is more likely a
    /// different echo than continuous motion.
    pub max_motion_cm: f32,

    /// Azimuth tolerance for matching a detection to a track (degrees).
    pub azimuth_tolerance_deg: f32,

    /// Relative distance tolerance for matching, scaled to the new
    /// detection's distance (0.2 = 20%).
    pub distance_tolerance: f32,

    /// Confidence assigned to a freshly created track.
    pub initial_confidence: u8,

    /// Confidence added on every matching detection (capped at
    /// [`CONFIDENCE_MAX`]).
    pub confidence_step: u8,

    /// A track reports as "active" only while its confidence exceeds this.
    pub active_confidence: u8,

    /// Unseen-for longer than this (ms) and a track's confidence starts
    /// decaying.
    pub decay_after_ms: u64,

    /// Confidence subtracted per lifecycle pass while decaying.
    pub decay_step: u8,

    /// A decaying track whose confidence falls below this is freed.
    pub min_confidence: u8,

    /// Unseen-for longer than this (ms) and a track is freed outright,
    /// regardless of confidence.
    pub stale_after_ms: u64,

    /// Bearing assigned to detections from each sensor (degrees).
    ///
    /// Reference layout: sensor 0 faces front (0°), sensor 1 left (270°),
    /// sensor 2 right (90°). Other geometries substitute their own headings.
    pub azimuths_deg: [f32; SENSOR_COUNT],
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_range_cm: 2.0,
            max_range_cm: 400.0,
            echo_timeout_us: 30_000,
            poll_base_ms: 50,
            poll_stagger_ms: 20,
            tracking_interval_ms: 100,
            signature_min_cm: 15.0,
            signature_max_cm: 500.0,
            min_motion_cm: 2.0,
            max_motion_cm: 100.0,
            azimuth_tolerance_deg: 30.0,
            distance_tolerance: 0.2,
            initial_confidence: 20,
            confidence_step: 10,
            active_confidence: 30,
            decay_after_ms: 500,
            decay_step: 5,
            min_confidence: 10,
            stale_after_ms: 2000,
            azimuths_deg: [0.0, 270.0, 90.0],
        }
    }
}

impl DetectionConfig {
    /// Minimum gap between polls of the given channel (ms).
    pub fn poll_gap_ms(&self, channel: usize) -> u64 {
        self.poll_base_ms + self.poll_stagger_ms * channel as u64
    }
}
