use iris_pointer::gaze::blink::{BlinkConfig, BlinkDetector};
use iris_pointer::gaze::ear::{eye_aspect_ratio, EyeContour};
use iris_pointer::gaze::{Image, Point2};

fn contour(raw: [[f64; 2]; 6]) -> EyeContour<Image> {
    EyeContour::new(raw.map(Point2::from))
}

#[test]
fn reference_contour_clicks_on_fourth_frame() {
    let reference = contour([[0.0, 0.0], [1.0, -2.0], [2.0, -2.0], [3.0, 0.0], [2.0, 2.0], [1.0, 2.0]]);
    let ear = eye_aspect_ratio(&reference);
    assert!(ear > 0.0);

    // threshold sits just above the reference EAR so it reads as closed
    let mut detector = BlinkDetector::new(BlinkConfig {
        ear_threshold: ear + 0.01,
        consecutive_frames: 2,
    });
    let wide_open = contour([[0.0, 0.0], [1.0, -3.0], [2.0, -3.0], [3.0, 0.0], [2.0, 3.0], [1.0, 3.0]]);

    let frames = [&reference, &reference, &reference, &wide_open];
    let clicks: Vec<bool> = frames
        .iter()
        .map(|c| detector.update(eye_aspect_ratio(c)).is_some())
        .collect();

    assert_eq!(clicks, vec![false, false, false, true]);
    assert_eq!(detector.total_blinks(), 1);
}

#[test]
fn separate_blinks_each_click() {
    let mut detector = BlinkDetector::default();
    let pattern = [0.1, 0.1, 0.3, 0.3, 0.05, 0.05, 0.05, 0.31, 0.1, 0.3];
    let clicks = pattern
        .iter()
        .filter_map(|&ear| detector.update(ear))
        .map(|event| event.closed_frames)
        .collect::<Vec<_>>();
    assert_eq!(clicks, vec![2, 3]);
    assert_eq!(detector.total_blinks(), 2);
}

#[test]
fn degenerate_contour_reads_as_closed() {
    let collapsed = contour([[4.0, 4.0]; 6]);
    let mut detector = BlinkDetector::default();
    detector.update(eye_aspect_ratio(&collapsed));
    detector.update(eye_aspect_ratio(&collapsed));
    assert_eq!(detector.state().consecutive_low_frames, 2);
    assert!(detector.update(0.3).is_some());
}
