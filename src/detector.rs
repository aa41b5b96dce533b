//! Multi-Sensor Detection and Tracking Engine
//!
//! ## Overview
//!
//! [`BirdDetector`] owns the whole pipeline: per-channel ranging and
//! filtering, the signature gate, the track pool, lifecycle decay, and the
//! summary aggregates deterrent controllers read. One `update()` call runs
//! one scheduler tick of everything.
//!
//! ## Control flow per tick
//!
//! ```text
//! update()
//! ├── for each channel (index order):
//! │     stagger gate → trigger/echo → envelope check → history push
//! │                                                  → median filter
//! └── every tracking interval (100 ms):
//!       for each channel (index order):
//!           signature gate → match existing track (slot order, first
//!           match wins) → update in place, or allocate/evict
//!       lifecycle decay over all slots
//!       recompute aggregates (active count, closest distance)
//! ```
//!
//! ## Scheduling model
//!
//! Everything runs on one cooperative timeline. The ranging call is a
//! bounded blocking wait (worst case the 30 ms echo timeout) on that same
//! timeline - simplicity over responsiveness, and the per-channel stagger
//! keeps at most one channel due per pass in steady state. Channels are
//! polled at staggered minimum intervals (50/70/90 ms for the reference
//! layout) so two sensors never fire close together and cross-detect each
//! other's echoes.
//!
//! Association and lifecycle run at a coarser fixed cadence than polling:
//! tracking conclusions cannot change faster than new readings arrive, so
//! recomputing them per poll would only burn cycles.
//!
//! ## Failure semantics
//!
//! Nothing in here is fatal. A timed-out echo, an out-of-envelope reading,
//! a hardware fault on one channel, or a full track pool all degrade to
//! "that channel/detection contributes nothing this tick". Deterrence must
//! never stop operating because one sensor misbehaves; only
//! [`run_self_test`](BirdDetector::run_self_test) reports faults
//! explicitly.

use heapless::Vec;

use crate::buffer::DistanceHistory;
use crate::config::{DetectionConfig, HISTORY_DEPTH, MAX_TRACKS, NO_TARGET_CM, SENSOR_COUNT};
use crate::filter;
use crate::ranging::{Ranger, RangingDevice};
use crate::signature::SignatureGate;
use crate::time::{TimeSource, Timestamp};
use crate::track::{Track, TrackStore, TrackView};

// Optional logging, compiled out without the `log` feature.
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Per-sensor channel state: history, filter output, poll schedule.
#[derive(Debug, Clone)]
struct SensorChannel {
    /// Ring of recent raw distances feeding the filter.
    history: DistanceHistory<HISTORY_DEPTH>,
    /// Last median-filtered output; sentinel means "no valid target".
    filtered_cm: f32,
    /// Timestamp of the last *successful* ranging attempt. Unsuccessful
    /// attempts leave it untouched so the channel retries next tick.
    last_poll: Timestamp,
    /// Whether the channel participates in polling and association.
    active: bool,
}

impl SensorChannel {
    const fn new() -> Self {
        Self {
            history: DistanceHistory::new(),
            filtered_cm: NO_TARGET_CM,
            last_poll: 0,
            active: true,
        }
    }

    fn reset(&mut self) {
        self.history.clear();
        self.filtered_cm = NO_TARGET_CM;
        self.last_poll = 0;
    }
}

/// The detection-and-tracking engine.
///
/// Generic over the hardware ranging capability and the clock so firmware
/// injects real drivers and tests inject fakes. All state is owned here;
/// external callers only ever receive copies.
pub struct BirdDetector<D: RangingDevice, T: TimeSource> {
    devices: [D; SENSOR_COUNT],
    channels: [SensorChannel; SENSOR_COUNT],
    ranger: Ranger,
    gate: SignatureGate,
    tracks: TrackStore,
    config: DetectionConfig,
    time: T,
    enabled: bool,
    last_tracking: Timestamp,
    active_count: u32,
    closest_cm: f32,
}

impl<D: RangingDevice, T: TimeSource> BirdDetector<D, T> {
    /// Builds a detector with the default configuration.
    pub fn new(devices: [D; SENSOR_COUNT], time: T) -> Self {
        Self::with_config(devices, time, DetectionConfig::default())
    }

    /// Builds a detector with an explicit configuration.
    pub fn with_config(devices: [D; SENSOR_COUNT], time: T, config: DetectionConfig) -> Self {
        Self {
            devices,
            channels: core::array::from_fn(|_| SensorChannel::new()),
            ranger: Ranger::new(&config),
            gate: SignatureGate::new(&config),
            tracks: TrackStore::new(),
            config,
            time,
            enabled: true,
            last_tracking: 0,
            active_count: 0,
            closest_cm: NO_TARGET_CM,
        }
    }

    /// Runs one scheduler tick: poll due channels, then - at the tracking
    /// cadence - associate detections, age tracks, and refresh aggregates.
    ///
    /// A no-op while the detector is disabled.
    pub fn update(&mut self) {
        if !self.enabled {
            return;
        }

        let now = self.time.now();

        for index in 0..SENSOR_COUNT {
            self.poll_channel(index, now);
        }

        if now.saturating_sub(self.last_tracking) > self.config.tracking_interval_ms {
            self.associate(now);
            self.age_tracks(now);
            let (count, closest_cm) = self.tracks.aggregates(self.config.active_confidence);
            self.active_count = count;
            self.closest_cm = closest_cm;
            self.last_tracking = now;
        }
    }

    /// One ranging attempt on a channel, honoring its stagger interval.
    fn poll_channel(&mut self, index: usize, now: Timestamp) {
        if !self.channels[index].active {
            return;
        }
        if now.saturating_sub(self.channels[index].last_poll) <= self.config.poll_gap_ms(index) {
            return;
        }

        match self.ranger.measure(&mut self.devices[index]) {
            Ok(Some(distance_cm)) => {
                let channel = &mut self.channels[index];
                channel.history.push(distance_cm);
                channel.filtered_cm = filter::filtered(&channel.history);
                channel.last_poll = now;
            }
            // No echo or out of envelope: nothing in range this attempt.
            Ok(None) => {}
            Err(_err) => {
                log_debug!("channel {} ranging fault: {}", index, _err);
            }
        }
    }

    /// Matches each channel's current detection to the track pool.
    ///
    /// Channels are visited in index order and tracks scanned in slot
    /// order with first-match-wins. Deterministic and order-dependent on
    /// purpose; tests pin the order.
    fn associate(&mut self, now: Timestamp) {
        for index in 0..SENSOR_COUNT {
            let channel = &self.channels[index];
            if !channel.active {
                continue;
            }

            let distance_cm = channel.filtered_cm;
            let previous_raw_cm = channel.history.previous_raw();
            if self.gate.check(distance_cm, previous_raw_cm).is_err() {
                continue;
            }

            let azimuth_deg = self.config.azimuths_deg[index];

            match self.tracks.find_match(
                azimuth_deg,
                distance_cm,
                self.config.azimuth_tolerance_deg,
                self.config.distance_tolerance,
            ) {
                Some(slot) => self.tracks.sighted(
                    slot,
                    distance_cm,
                    azimuth_deg,
                    now,
                    self.config.confidence_step,
                ),
                None => self.spawn_track(distance_cm, azimuth_deg, now),
            }
        }
    }

    /// Allocates a slot for an unmatched detection.
    ///
    /// First free slot wins. With a full pool, the lowest-confidence track
    /// (lowest index on ties) is displaced - but only when its confidence
    /// is already below what the newcomer would start with; an established
    /// track is never traded for a single unmatched reading. Otherwise the
    /// detection is dropped for this pass.
    fn spawn_track(&mut self, distance_cm: f32, azimuth_deg: f32, now: Timestamp) {
        let slot = match self.tracks.first_free() {
            Some(slot) => slot,
            None => match self.tracks.weakest() {
                Some((slot, confidence)) if confidence < self.config.initial_confidence => {
                    log_debug!("track pool full, evicting slot {} (confidence {})", slot, confidence);
                    slot
                }
                _ => {
                    log_debug!("track pool full, dropping detection at {} cm", distance_cm);
                    return;
                }
            },
        };

        self.tracks.occupy(
            slot,
            Track::new(distance_cm, azimuth_deg, now, self.config.initial_confidence),
        );
    }

    /// Ages tracks, freeing stale ones.
    ///
    /// Unseen beyond `stale_after_ms` frees the slot outright, whatever
    /// the confidence. Unseen beyond `decay_after_ms` bleeds confidence
    /// per pass until the track drops below `min_confidence` and is freed.
    fn age_tracks(&mut self, now: Timestamp) {
        for index in 0..MAX_TRACKS {
            let (last_seen, confidence) = match self.tracks.get(index) {
                Some(track) => (track.last_seen, track.confidence),
                None => continue,
            };
            let unseen_ms = now.saturating_sub(last_seen);

            if unseen_ms > self.config.stale_after_ms {
                self.tracks.free(index);
            } else if unseen_ms > self.config.decay_after_ms {
                let decayed = confidence.saturating_sub(self.config.decay_step);
                if decayed < self.config.min_confidence {
                    self.tracks.free(index);
                } else if let Some(track) = self.tracks.get_mut(index) {
                    track.confidence = decayed;
                }
            }
        }
    }

    // --- outbound surface for the deterrent controllers ---

    /// True if any sufficiently confident track lies within `max_range_cm`.
    pub fn is_object_detected(&self, max_range_cm: f32) -> bool {
        self.enabled && self.active_count > 0 && self.closest_cm <= max_range_cm
    }

    /// Number of tracks currently confident enough to report.
    pub fn active_track_count(&self) -> u32 {
        self.active_count
    }

    /// Distance to the closest reporting track (cm), or the
    /// [`NO_TARGET_CM`] sentinel when none qualify.
    pub fn closest_distance(&self) -> f32 {
        self.closest_cm
    }

    /// Snapshot of the track in `index`, if that slot is occupied.
    pub fn track_snapshot(&self, index: usize) -> Option<TrackView> {
        self.tracks.get(index).map(Track::view)
    }

    /// Radial speed of the track in `index` (m/s); 0.0 for free or
    /// out-of-range slots.
    pub fn track_velocity(&self, index: usize) -> f32 {
        self.tracks.get(index).map_or(0.0, |track| track.velocity_mps)
    }

    /// Snapshots of every reporting-active track, in slot order.
    pub fn active_tracks(&self) -> Vec<TrackView, MAX_TRACKS> {
        let mut views = Vec::new();
        for (_, track) in self.tracks.iter_occupied() {
            if track.confidence > self.config.active_confidence {
                // Capacity equals the pool size, the push cannot fail.
                let _ = views.push(track.view());
            }
        }
        views
    }

    /// Enables or disables the whole pipeline. While disabled, `update()`
    /// does nothing and nothing is reported as detected.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the pipeline is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables one sensor channel. Out-of-range indexes are
    /// ignored.
    pub fn set_channel_active(&mut self, index: usize, active: bool) {
        if let Some(channel) = self.channels.get_mut(index) {
            channel.active = active;
        }
    }

    /// Exercises each active channel's trigger/echo path once.
    ///
    /// A channel passes when its device answers without a hardware fault;
    /// an echo timeout still passes, since the path works and there is
    /// simply no target. Diagnostic only - normal operation never calls
    /// this.
    pub fn run_self_test(&mut self) -> bool {
        let mut all_passed = true;

        for (index, device) in self.devices.iter_mut().enumerate() {
            if !self.channels[index].active {
                continue;
            }
            match device.trigger_and_measure(self.config.echo_timeout_us) {
                Ok(_) => {
                    log_info!("self-test: channel {} ok", index);
                }
                Err(_err) => {
                    log_warn!("self-test: channel {} failed: {}", index, _err);
                    all_passed = false;
                }
            }
        }

        all_passed
    }

    /// Clears all tracks, history, and aggregates back to the initial
    /// empty state. The enabled flag is left as-is.
    pub fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
        self.tracks.clear();
        self.last_tracking = 0;
        self.active_count = 0;
        self.closest_cm = NO_TARGET_CM;
    }
}
