//! Median-of-Window Noise Filter
//!
//! Ultrasonic ranging in the open is noisy in a very particular way: most
//! samples are good, but the occasional echo arrives off a wall, a second
//! sensor's pulse, or nothing at all, producing a single wildly near or far
//! reading. A median over a short window rejects exactly that - any lone
//! outlier lands at an end of the sorted window and never becomes the
//! output - while staying responsive within roughly one window's worth of
//! polls.
//!
//! A full statistical filter would be wasted here: the noise is bounded and
//! roughly stationary, and O(W log W) per accepted sample at these polling
//! rates is nothing.

use crate::buffer::DistanceHistory;
use crate::config::{FILTER_WINDOW, HISTORY_DEPTH};

/// Median of a window of samples (middle element after sorting).
///
/// `total_cmp` gives a total order over f32, so the sort is deterministic
/// even if a NaN ever slipped in.
pub fn median<const W: usize>(mut window: [f32; W]) -> f32 {
    window.sort_unstable_by(f32::total_cmp);
    window[W / 2]
}

/// Filtered output for a channel: the median of the [`FILTER_WINDOW`] most
/// recently written samples in its history.
///
/// Before the window has warmed up with real samples, the sentinel slots
/// dominate the median and the output resolves toward "no valid target".
pub fn filtered(history: &DistanceHistory<HISTORY_DEPTH>) -> f32 {
    median(history.window::<FILTER_WINDOW>())
}
