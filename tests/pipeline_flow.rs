mod common;

use iris_pointer::gaze::{ScreenPoint, ScreenSize};
use iris_pointer::pointer::PointerCommand;
use iris_pointer::tracker::{Mode, Tracker, TrackerConfig};

use common::face::{
    capture_frame, face_frame, looking_at, no_face_frame, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use common::RecordingPointer;

fn tracker() -> Tracker {
    Tracker::new(TrackerConfig {
        screen: ScreenSize::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        ..TrackerConfig::default()
    })
}

/// Walk the full 9-target grid, one capture every 300 ms. Returns the next free timestamp.
fn calibrate(tracker: &mut Tracker, pointer: &mut RecordingPointer, start_ms: u64) -> u64 {
    let targets = tracker.targets().to_vec();
    let mut ts = start_ms;
    for (i, target) in targets.iter().enumerate() {
        assert_eq!(tracker.current_target(), Some(*target));
        let outcome = tracker.process_frame(&capture_frame(ts, *target), pointer);
        assert_eq!(outcome.captured, Some(i));
        ts += 300;
    }
    ts
}

#[test]
fn calibration_then_tracking_moves_pointer() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();

    let ts = calibrate(&mut tracker, &mut pointer, 0);
    assert_eq!(tracker.mode(), Mode::Tracking);
    assert!(tracker.calibration().is_calibrated());
    assert_eq!(tracker.calibration().sample_count(), 9);
    // no pointer motion while calibrating
    assert!(pointer.last_move().is_none());

    let gaze = ScreenPoint::new(1000, 500);
    let mut last = None;
    for i in 0..15 {
        last = tracker.process_frame(&looking_at(ts + i * 33, gaze), &mut pointer).moved_to;
    }
    assert_eq!(last, Some(gaze));
    assert_eq!(pointer.last_move(), Some(gaze));
    assert_eq!(tracker.smoother().len(), 10);
}

#[test]
fn final_capture_reports_fit() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let targets = tracker.targets().to_vec();

    let mut ts = 0;
    for target in &targets[..8] {
        let outcome = tracker.process_frame(&capture_frame(ts, *target), &mut pointer);
        assert!(outcome.fit.is_none());
        ts += 250;
    }
    let outcome = tracker.process_frame(&capture_frame(ts, targets[8]), &mut pointer);
    let report = outcome.fit.expect("fit attempted").expect("fit succeeds");
    assert_eq!(report.samples, 9);
    assert_eq!(report.inliers, 9);
    assert!(report.mean_error_px < 1.0);
}

#[test]
fn tracking_output_is_clamped_to_screen() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let ts = calibrate(&mut tracker, &mut pointer, 0);

    let outcome = tracker.process_frame(&looking_at(ts, ScreenPoint::new(5000, -700)), &mut pointer);
    assert_eq!(
        outcome.moved_to,
        Some(ScreenPoint::new(SCREEN_WIDTH - 1, 0))
    );
}

#[test]
fn captures_are_debounced() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let targets = tracker.targets().to_vec();

    let first = tracker.process_frame(&capture_frame(1_000, targets[0]), &mut pointer);
    assert_eq!(first.captured, Some(0));

    // same trigger still held 100 ms later
    let bounced = tracker.process_frame(&capture_frame(1_100, targets[1]), &mut pointer);
    assert_eq!(bounced.captured, None);
    assert_eq!(tracker.calibration().sample_count(), 1);
    assert_eq!(tracker.current_target(), Some(targets[1]));

    let second = tracker.process_frame(&capture_frame(1_200, targets[1]), &mut pointer);
    assert_eq!(second.captured, Some(1));
    assert_eq!(tracker.calibration().sample_count(), 2);
}

#[test]
fn capture_without_face_is_ignored() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();

    let mut frame = no_face_frame(0);
    frame.capture = true;
    let outcome = tracker.process_frame(&frame, &mut pointer);
    assert_eq!(outcome.captured, None);
    assert_eq!(outcome.ear, None);
    assert_eq!(tracker.calibration().sample_count(), 0);
}

#[test]
fn failed_fit_restarts_target_sequence() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let targets = tracker.targets().to_vec();

    // user stared at one spot for every target
    let fixed = targets[4];
    let mut last = None;
    for (i, _) in targets.iter().enumerate() {
        last = Some(tracker.process_frame(&capture_frame(i as u64 * 300, fixed), &mut pointer));
    }

    let outcome = last.unwrap();
    assert!(matches!(outcome.fit, Some(Err(_))));
    assert!(!tracker.calibration().is_calibrated());
    assert_eq!(tracker.calibration().sample_count(), 0);
    assert!(matches!(tracker.mode(), Mode::Calibrating { target_index: 0, .. }));

    // a clean second pass succeeds
    calibrate(&mut tracker, &mut pointer, 10_000);
    assert!(tracker.is_tracking());
}

#[test]
fn restart_returns_to_calibration() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let ts = calibrate(&mut tracker, &mut pointer, 0);
    tracker.process_frame(&looking_at(ts, ScreenPoint::new(400, 400)), &mut pointer);
    assert!(!tracker.smoother().is_empty());

    let mut frame = looking_at(ts + 33, ScreenPoint::new(400, 400));
    frame.restart = true;
    let outcome = tracker.process_frame(&frame, &mut pointer);

    assert!(outcome.restarted);
    assert_eq!(outcome.moved_to, None);
    assert!(!tracker.calibration().is_calibrated());
    assert!(tracker.smoother().is_empty());
    assert_eq!(tracker.current_target(), Some(tracker.targets()[0]));
}

#[test]
fn blink_clicks_in_both_modes() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let eye = [0.5, 0.45];

    // calibrating
    for (i, open) in [false, false, true].into_iter().enumerate() {
        tracker.process_frame(&face_frame(i as u64 * 33, eye, open), &mut pointer);
    }
    assert_eq!(pointer.clicks(), 1);

    let ts = calibrate(&mut tracker, &mut pointer, 1_000);
    assert!(tracker.is_tracking());

    // tracking: three closed frames then reopen
    let mut clicked_on = Vec::new();
    for (i, open) in [false, false, false, true].into_iter().enumerate() {
        let outcome = tracker.process_frame(&face_frame(ts + i as u64 * 33, eye, open), &mut pointer);
        if outcome.clicked {
            clicked_on.push(i);
        }
    }
    assert_eq!(clicked_on, vec![3]);
    assert_eq!(pointer.clicks(), 2);
    assert_eq!(tracker.blink().total_blinks(), 2);
}

#[test]
fn missing_detection_skips_frame() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let ts = calibrate(&mut tracker, &mut pointer, 0);
    let history = tracker.smoother().len();

    let outcome = tracker.process_frame(&no_face_frame(ts), &mut pointer);
    assert_eq!(outcome.moved_to, None);
    assert_eq!(tracker.smoother().len(), history);
    assert!(tracker.is_tracking());
}

#[test]
fn failsafe_does_not_end_session() {
    let mut tracker = tracker();
    let mut pointer = RecordingPointer::default();
    let ts = calibrate(&mut tracker, &mut pointer, 0);

    pointer.failsafe = true;
    let gaze = ScreenPoint::new(0, 0);
    let outcome = tracker.process_frame(&looking_at(ts, gaze), &mut pointer);
    assert_eq!(outcome.moved_to, Some(gaze));
    assert!(pointer
        .commands
        .iter()
        .all(|c| !matches!(c, PointerCommand::Move { .. })));

    pointer.failsafe = false;
    let outcome = tracker.process_frame(&looking_at(ts + 33, ScreenPoint::new(10, 10)), &mut pointer);
    assert!(outcome.moved_to.is_some());
    assert!(tracker.is_tracking());
}
