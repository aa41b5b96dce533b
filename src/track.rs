//! Track Slots and the Fixed-Capacity Track Store
//!
//! A track is one hypothesis about one physical object, persisted across
//! ticks in a fixed slot. There are no external track IDs: identity is
//! slot occupancy, and consumers index by slot position. The store owns
//! all track memory outright - nothing outside this crate ever holds a
//! reference into it, only [`TrackView`] snapshots copied out on request,
//! so a consumer can never observe a half-updated track.
//!
//! The pool is an arena of `Option<Track>`: `None` is a free slot,
//! `Some` is occupied. All scans run in slot-index order, which makes
//! allocation and matching deterministic and order-dependent on purpose -
//! tests pin that order.

use crate::config::{CM_PER_METER, CONFIDENCE_MAX, MAX_TRACKS, MS_PER_SECOND, NO_TARGET_CM};
use crate::time::Timestamp;

/// One tracked object hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Track {
    /// Current estimated range (cm).
    pub distance_cm: f32,
    /// Range at the previous sighting (cm).
    pub previous_distance_cm: f32,
    /// Bearing of the sensor that last matched this track (degrees).
    pub azimuth_deg: f32,
    /// Timestamp of the last matching detection or of creation (ms).
    pub last_seen: Timestamp,
    /// Radial speed magnitude (m/s), derived from distance change over
    /// the elapsed time between sightings.
    pub velocity_mps: f32,
    /// Corroboration score in [0, 100]. Gates "active" reporting.
    pub confidence: u8,
}

impl Track {
    /// Fresh track from an unmatched detection.
    pub fn new(distance_cm: f32, azimuth_deg: f32, now: Timestamp, confidence: u8) -> Self {
        Self {
            distance_cm,
            previous_distance_cm: distance_cm,
            azimuth_deg,
            last_seen: now,
            velocity_mps: 0.0,
            confidence,
        }
    }

    /// Whether a detection at `azimuth_deg`/`distance_cm` belongs to this
    /// track: azimuth within tolerance, distance within a relative
    /// tolerance scaled to the *new* distance.
    ///
    /// Azimuth difference is a plain absolute difference, no wraparound;
    /// sensor headings in a layout are expected to sit well apart.
    pub fn matches(
        &self,
        azimuth_deg: f32,
        distance_cm: f32,
        azimuth_tolerance_deg: f32,
        distance_tolerance: f32,
    ) -> bool {
        libm::fabsf(self.azimuth_deg - azimuth_deg) < azimuth_tolerance_deg
            && libm::fabsf(self.distance_cm - distance_cm) < distance_cm * distance_tolerance
    }

    /// Updates the track in place for a matching detection.
    ///
    /// The elapsed time for velocity is taken against the *previous*
    /// `last_seen`, before it is overwritten - the distance change only
    /// has a meaningful rate over the interval between sightings.
    pub fn sighted(&mut self, distance_cm: f32, azimuth_deg: f32, now: Timestamp, step: u8) {
        let elapsed_ms = now.saturating_sub(self.last_seen);

        self.previous_distance_cm = self.distance_cm;
        self.distance_cm = distance_cm;
        self.azimuth_deg = azimuth_deg;

        if elapsed_ms > 0 {
            let delta_m =
                libm::fabsf(self.distance_cm - self.previous_distance_cm) / CM_PER_METER;
            self.velocity_mps = delta_m / (elapsed_ms as f32 / MS_PER_SECOND as f32);
        }

        self.last_seen = now;
        self.confidence = self.confidence.saturating_add(step).min(CONFIDENCE_MAX);
    }

    /// Copy-out snapshot for consumers.
    pub fn view(&self) -> TrackView {
        TrackView {
            distance_cm: self.distance_cm,
            previous_distance_cm: self.previous_distance_cm,
            azimuth_deg: self.azimuth_deg,
            last_seen: self.last_seen,
            velocity_mps: self.velocity_mps,
            confidence: self.confidence,
        }
    }
}

/// Read-only snapshot of an occupied track slot.
///
/// Returned by value; holds no reference into the store.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackView {
    /// Current estimated range (cm).
    pub distance_cm: f32,
    /// Range at the previous sighting (cm).
    pub previous_distance_cm: f32,
    /// Bearing of the sensor that last matched this track (degrees).
    pub azimuth_deg: f32,
    /// Timestamp of the last matching detection or of creation (ms).
    pub last_seen: Timestamp,
    /// Radial speed magnitude (m/s).
    pub velocity_mps: f32,
    /// Corroboration score in [0, 100].
    pub confidence: u8,
}

/// Fixed pool of [`MAX_TRACKS`] track slots.
#[derive(Debug, Clone)]
pub(crate) struct TrackStore {
    slots: [Option<Track>; MAX_TRACKS],
}

impl TrackStore {
    /// Empty pool, every slot free.
    pub const fn new() -> Self {
        Self { slots: [None; MAX_TRACKS] }
    }

    /// Borrow the track in a slot, if occupied. Out-of-range indexes read
    /// as free.
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutably borrow the track in a slot, if occupied.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Lowest-index free slot, if any.
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Occupied slot with the lowest confidence (lowest index wins ties).
    pub fn weakest(&self) -> Option<(usize, u8)> {
        let mut weakest: Option<(usize, u8)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(track) = slot {
                match weakest {
                    Some((_, confidence)) if track.confidence >= confidence => {}
                    _ => weakest = Some((index, track.confidence)),
                }
            }
        }
        weakest
    }

    /// First occupied slot, in index order, matching the detection.
    pub fn find_match(
        &self,
        azimuth_deg: f32,
        distance_cm: f32,
        azimuth_tolerance_deg: f32,
        distance_tolerance: f32,
    ) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref().is_some_and(|track| {
                track.matches(azimuth_deg, distance_cm, azimuth_tolerance_deg, distance_tolerance)
            })
        })
    }

    /// Record a matching detection against the track in `index`.
    pub fn sighted(&mut self, index: usize, distance_cm: f32, azimuth_deg: f32, now: Timestamp, step: u8) {
        if let Some(track) = self.get_mut(index) {
            track.sighted(distance_cm, azimuth_deg, now, step);
        }
    }

    /// Place a track in a slot, occupying or displacing it.
    pub fn occupy(&mut self, index: usize, track: Track) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(track);
        }
    }

    /// Free a slot.
    pub fn free(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }

    /// Free every slot.
    pub fn clear(&mut self) {
        self.slots = [None; MAX_TRACKS];
    }

    /// Iterate occupied slots with their indexes.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, &Track)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|track| (index, track)))
    }

    /// Summary statistics over sufficiently confident tracks: count of
    /// occupied slots with confidence above `active_confidence`, and the
    /// minimum distance among them ([`NO_TARGET_CM`] if none qualify).
    pub fn aggregates(&self, active_confidence: u8) -> (u32, f32) {
        let mut count = 0u32;
        let mut closest_cm = NO_TARGET_CM;

        for (_, track) in self.iter_occupied() {
            if track.confidence > active_confidence {
                count += 1;
                if track.distance_cm < closest_cm {
                    closest_cm = track.distance_cm;
                }
            }
        }

        (count, closest_cm)
    }
}
