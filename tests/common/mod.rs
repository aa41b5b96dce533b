//! Shared test doubles for the integration suite.
//!
//! The detector takes ownership of its devices and clock, so both fakes
//! hand out cloneable handles backed by `Rc<RefCell<_>>`: the test body
//! keeps one handle to script responses and inspect call counts while the
//! detector drives the other.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use perchguard::config::CM_PER_US_ROUND_TRIP;
use perchguard::time::{TimeSource, Timestamp};
use perchguard::{RangingDevice, RangingResult};

/// Clock shared between the test body and the detector.
#[derive(Clone)]
pub struct SharedClock(Rc<RefCell<Timestamp>>);

impl SharedClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Rc::new(RefCell::new(start)))
    }

    pub fn set(&self, timestamp: Timestamp) {
        *self.0.borrow_mut() = timestamp;
    }
}

impl TimeSource for SharedClock {
    fn now(&self) -> Timestamp {
        *self.0.borrow()
    }
}

struct FakeRangerState {
    script: VecDeque<RangingResult<Option<u32>>>,
    calls: usize,
}

/// Scripted ranging device.
///
/// Pops one response per trigger; an exhausted script answers "no echo".
#[derive(Clone)]
pub struct FakeRanger {
    inner: Rc<RefCell<FakeRangerState>>,
}

impl FakeRanger {
    /// Device that never sees an echo.
    pub fn quiet() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FakeRangerState {
                script: VecDeque::new(),
                calls: 0,
            })),
        }
    }

    /// Device scripted to echo back the given distances, one per trigger.
    pub fn with_distances(distances_cm: &[f32]) -> Self {
        let device = Self::quiet();
        for &cm in distances_cm {
            device.push_response(Ok(Some(echo_us(cm))));
        }
        device
    }

    /// Append one raw response to the script.
    pub fn push_response(&self, response: RangingResult<Option<u32>>) {
        self.inner.borrow_mut().script.push_back(response);
    }

    /// Number of trigger/echo cycles the detector has run on this device.
    pub fn calls(&self) -> usize {
        self.inner.borrow().calls
    }
}

impl RangingDevice for FakeRanger {
    fn trigger_and_measure(&mut self, _timeout_us: u32) -> RangingResult<Option<u32>> {
        let mut state = self.inner.borrow_mut();
        state.calls += 1;
        state.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Echo high-time (µs) that converts back to roughly `cm`.
pub fn echo_us(cm: f32) -> u32 {
    (cm * 2.0 / CM_PER_US_ROUND_TRIP) as u32
}
