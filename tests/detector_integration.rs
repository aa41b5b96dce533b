//! End-to-end scenarios for the detection pipeline
//!
//! Drives a full detector through scripted echo sequences on a hand-set
//! clock and checks the outbound surface the deterrent controllers read:
//! track continuity across ticks, confidence progression, stale-track
//! expiry, poll staggering, and the diagnostic self-test.

mod common;

use common::{FakeRanger, SharedClock};
use perchguard::config::NO_TARGET_CM;
use perchguard::{BirdDetector, RangingError};

fn detector_with(
    front: &FakeRanger,
    left: &FakeRanger,
    right: &FakeRanger,
) -> (BirdDetector<FakeRanger, SharedClock>, SharedClock) {
    let clock = SharedClock::new(0);
    let detector = BirdDetector::new(
        [front.clone(), left.clone(), right.clone()],
        clock.clone(),
    );
    (detector, clock)
}

fn drive(detector: &mut BirdDetector<FakeRanger, SharedClock>, clock: &SharedClock, ticks: &[u64]) {
    for &t in ticks {
        clock.set(t);
        detector.update();
    }
}

/// An approaching object seen by one sensor must stay in one track slot
/// with confidence climbing 20 → 30 → 40, while a second sensor's object
/// lands in the next slot - detections are processed in channel index
/// order and never duplicated.
#[test]
fn track_continuity_and_slot_order() {
    // Front sensor: object approaching from 160 cm down to 142 cm.
    let front = FakeRanger::with_distances(&[160.0, 156.0, 152.0, 150.0, 147.0, 146.0, 144.0, 142.0]);
    let left = FakeRanger::quiet();
    // Right sensor: a second object around 60-70 cm, polled less often
    // (larger stagger interval).
    let right = FakeRanger::with_distances(&[70.0, 66.0, 62.0, 60.0]);

    let (mut detector, clock) = detector_with(&front, &left, &right);

    // Warmup: the front channel's filter window still medians to the
    // sentinel, so no track exists yet.
    drive(&mut detector, &clock, &[60, 120]);
    assert!(detector.track_snapshot(0).is_none());
    assert_eq!(detector.active_track_count(), 0);

    // First valid detection: a fresh track at starting confidence.
    drive(&mut detector, &clock, &[180, 240]);
    let view = detector.track_snapshot(0).expect("track created");
    assert_eq!(view.azimuth_deg, 0.0);
    assert!((view.distance_cm - 156.0).abs() < 0.1);
    assert_eq!(view.confidence, 20);
    assert_eq!(view.velocity_mps, 0.0);
    // Not yet confident enough to report.
    assert_eq!(detector.active_track_count(), 0);
    assert!(!detector.is_object_detected(400.0));

    // Second sighting updates the same slot, never a new one. The right
    // sensor's object appears in the next free slot.
    drive(&mut detector, &clock, &[300, 360]);
    let view = detector.track_snapshot(0).expect("track persists");
    assert!((view.distance_cm - 150.0).abs() < 0.1);
    assert_eq!(view.confidence, 30);
    // 6 cm closer over 120 ms: 0.5 m/s.
    assert!((detector.track_velocity(0) - 0.5).abs() < 0.01);

    let side = detector.track_snapshot(1).expect("second object in next slot");
    assert_eq!(side.azimuth_deg, 90.0);
    assert_eq!(side.confidence, 20);

    // Third sighting crosses the reporting threshold.
    drive(&mut detector, &clock, &[420, 480]);
    let view = detector.track_snapshot(0).expect("track persists");
    assert!((view.distance_cm - 146.0).abs() < 0.1);
    assert_eq!(view.confidence, 40);
    assert!((detector.track_velocity(0) - 1.0 / 3.0).abs() < 0.01);

    let side = detector.track_snapshot(1).expect("second track persists");
    assert!((side.distance_cm - 66.0).abs() < 0.1);
    assert_eq!(side.confidence, 30);

    // Only the confidence-40 track reports; the closest distance comes
    // from it, not from the nearer but unconfident one.
    assert_eq!(detector.active_track_count(), 1);
    assert!((detector.closest_distance() - 146.0).abs() < 0.1);
    assert!(detector.is_object_detected(200.0));
    assert!(!detector.is_object_detected(100.0));
    assert_eq!(detector.active_tracks().len(), 1);
    assert!(detector.track_snapshot(2).is_none());
}

/// Once the object stops producing motion, its track decays and is freed
/// outright after two seconds of silence, whatever its confidence.
#[test]
fn stale_track_expires_end_to_end() {
    // Approach, then the readings settle (no sample-to-sample motion), so
    // the signature gate stops re-confirming the track.
    let front = FakeRanger::with_distances(&[
        160.0, 156.0, 152.0, 150.0, 147.0, 146.0, 144.0, 142.0, 146.0, 146.0,
    ]);
    let left = FakeRanger::quiet();
    let right = FakeRanger::quiet();

    let (mut detector, clock) = detector_with(&front, &left, &right);

    drive(&mut detector, &clock, &[60, 120, 180, 240, 300, 360, 420, 480, 540, 600]);
    let view = detector.track_snapshot(0).expect("track confirmed");
    assert_eq!(view.confidence, 40);
    assert_eq!(view.last_seen, 480);
    assert_eq!(detector.active_track_count(), 1);

    // Quiet for a while: confidence decays but the track survives.
    drive(&mut detector, &clock, &[1000]);
    let view = detector.track_snapshot(0).expect("decaying, not gone");
    assert_eq!(view.confidence, 35);
    assert_eq!(detector.active_track_count(), 1);

    // Past the staleness horizon: freed on the next lifecycle pass.
    drive(&mut detector, &clock, &[2481]);
    assert!(detector.track_snapshot(0).is_none());
    assert_eq!(detector.active_track_count(), 0);
    assert_eq!(detector.closest_distance(), NO_TARGET_CM);
    assert!(!detector.is_object_detected(400.0));
}

/// Channels fire on staggered minimum intervals (50/70/90 ms) so sensors
/// never trigger back-to-back, and a successful poll throttles the next
/// one while an echoless poll retries immediately.
#[test]
fn polling_is_staggered_per_channel() {
    let front = FakeRanger::with_distances(&[150.0]);
    let left = FakeRanger::quiet();
    let right = FakeRanger::quiet();

    let (mut detector, clock) = detector_with(&front, &left, &right);

    drive(&mut detector, &clock, &[60]);
    assert_eq!((front.calls(), left.calls(), right.calls()), (1, 0, 0));

    drive(&mut detector, &clock, &[80]);
    // Front succeeded at t=60, so 20 ms later it is still throttled;
    // the left channel's 70 ms stagger has elapsed.
    assert_eq!((front.calls(), left.calls(), right.calls()), (1, 1, 0));

    drive(&mut detector, &clock, &[100]);
    // Left saw no echo at t=80, so it retries; right's 90 ms stagger has
    // elapsed now too.
    assert_eq!((front.calls(), left.calls(), right.calls()), (1, 2, 1));
}

/// Self-test reports a hardware fault on any channel, while plain echo
/// timeouts pass - and it runs even with no targets anywhere.
#[test]
fn self_test_distinguishes_faults_from_silence() {
    let front = FakeRanger::quiet();
    let left = FakeRanger::quiet();
    let right = FakeRanger::quiet();
    left.push_response(Err(RangingError::DeviceFault { reason: "no response" }));

    let (mut detector, _clock) = detector_with(&front, &left, &right);

    assert!(!detector.run_self_test());
    // The fault was transient; the next pass is clean.
    assert!(detector.run_self_test());
    assert_eq!((front.calls(), left.calls(), right.calls()), (2, 2, 2));
}

/// A disabled detector does not range, track, or report.
#[test]
fn disabled_detector_is_inert() {
    let front = FakeRanger::with_distances(&[150.0, 148.0]);
    let left = FakeRanger::quiet();
    let right = FakeRanger::quiet();

    let (mut detector, clock) = detector_with(&front, &left, &right);

    detector.set_enabled(false);
    drive(&mut detector, &clock, &[60, 120, 180]);
    assert_eq!(front.calls(), 0);
    assert_eq!(detector.active_track_count(), 0);
    assert!(!detector.is_object_detected(400.0));

    detector.set_enabled(true);
    drive(&mut detector, &clock, &[240]);
    assert_eq!(front.calls(), 1);
}

/// `reset()` returns the detector to its initial empty state without
/// touching the enabled flag.
#[test]
fn reset_clears_everything() {
    let front = FakeRanger::with_distances(&[160.0, 156.0, 152.0, 150.0]);
    let left = FakeRanger::quiet();
    let right = FakeRanger::quiet();

    let (mut detector, clock) = detector_with(&front, &left, &right);

    drive(&mut detector, &clock, &[60, 120, 180, 240]);
    assert!(detector.track_snapshot(0).is_some());

    detector.reset();
    assert!(detector.track_snapshot(0).is_none());
    assert_eq!(detector.active_track_count(), 0);
    assert_eq!(detector.closest_distance(), NO_TARGET_CM);
    assert!(detector.is_enabled());
}
