//! Fixed-Size Ring Buffer of Raw Distance Samples
//!
//! ## Overview
//!
//! Each sensor channel keeps the last N raw distances it measured. The ring
//! feeds the median filter (which reads the most recently written window)
//! and the signature gate (which compares against the sample written just
//! before the latest one). The buffer has a fixed size determined at
//! compile time through const generics - no heap, deterministic memory.
//!
//! ## Design Rationale
//!
//! Unlike a general time-series buffer, slots here are *sentinel
//! initialized*: every slot starts at [`NO_TARGET_CM`] rather than empty.
//! That is deliberate. Reads taken before the buffer has warmed up with
//! fresh samples must resolve to "no valid target", never to stale garbage
//! or to an accidental zero that would look like a point-blank object. A
//! filter window that still contains sentinel slots simply medians toward
//! the sentinel, which the downstream range gate rejects.
//!
//! Consequences of the layout:
//! - `push()` is O(1): write at the cursor, advance modulo N
//! - the filter window is the W slots ending at the cursor, in buffer
//!   order - purely positional, no timestamps needed at this layer
//! - a sample that fails the physical range envelope never reaches
//!   `push()`, so the ring only ever holds in-envelope distances and the
//!   sentinel
//!
//! ## Memory Layout
//!
//! ```text
//! DistanceHistory<10> after 3 pushes:
//! ┌──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┐
//! │  s1  │  s2  │  s3  │ 9999 │ 9999 │ 9999 │ 9999 │ 9999 │ 9999 │ 9999 │
//! └──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┘
//!                          ↑ write_pos = 3
//!
//! 4 bytes per slot, 4·N + 16 bytes total.
//! ```

use crate::config::NO_TARGET_CM;

/// Ring buffer of the N most recent raw distance samples (cm).
///
/// ## Internal invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - every slot holds either a real in-envelope sample or the sentinel
/// - `filled` saturates at N and only counts real samples
#[derive(Debug, Clone)]
pub struct DistanceHistory<const N: usize> {
    /// Sample storage, sentinel-initialized.
    samples: [f32; N],

    /// Index where the next write will occur, wraps modulo N.
    write_pos: usize,

    /// Number of real samples written, saturating at N.
    filled: usize,
}

impl<const N: usize> DistanceHistory<N> {
    /// Creates a new history with every slot at the sentinel.
    ///
    /// Const so channels can be built in static contexts.
    pub const fn new() -> Self {
        Self {
            samples: [NO_TARGET_CM; N],
            write_pos: 0,
            filled: 0,
        }
    }

    /// Records a raw sample, overwriting the oldest slot.
    pub fn push(&mut self, raw_cm: f32) {
        self.samples[self.write_pos] = raw_cm;
        self.write_pos = (self.write_pos + 1) % N;

        if self.filled < N {
            self.filled += 1;
        }
    }

    /// Number of real samples recorded so far (saturates at N).
    pub fn len(&self) -> usize {
        self.filled
    }

    /// True until the first real sample is pushed.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// True once every slot has been overwritten at least once.
    pub fn is_warm(&self) -> bool {
        self.filled == N
    }

    /// The most recently written sample, or the sentinel if none.
    pub fn latest(&self) -> f32 {
        self.samples[(self.write_pos + N - 1) % N]
    }

    /// The sample written immediately before the latest one.
    ///
    /// This is what the signature gate compares the current filtered value
    /// against. With fewer than two real samples it reads a sentinel slot,
    /// which the gate's range band rejects anyway.
    pub fn previous_raw(&self) -> f32 {
        self.samples[(self.write_pos + N - 2) % N]
    }

    /// The W most recently written slots, in buffer order (oldest of the
    /// window first). Slots not yet overwritten read as the sentinel.
    pub fn window<const W: usize>(&self) -> [f32; W] {
        debug_assert!(W <= N, "window wider than history");

        let mut out = [NO_TARGET_CM; W];
        let start = (self.write_pos + N - W) % N;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.samples[(start + i) % N];
        }
        out
    }

    /// Resets every slot back to the sentinel.
    pub fn clear(&mut self) {
        self.samples = [NO_TARGET_CM; N];
        self.write_pos = 0;
        self.filled = 0;
    }
}

impl<const N: usize> Default for DistanceHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
