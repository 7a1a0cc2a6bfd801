//! Per-frame input from the landmark provider, one JSON object per line.
//!
//! ```json
//! {"timestamp_ms": 1200, "image_width": 640, "image_height": 480,
//!  "landmarks": [[0.51, 0.43], ...], "capture": false, "restart": false}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::LandmarkSet;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid image size {width}x{height}")]
    ImageSize { width: f64, height: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMessage {
    pub timestamp_ms: u64,
    pub image_width: f64,
    pub image_height: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<[f64; 2]>>,
    /// Operator asked to capture the current calibration target.
    #[serde(default)]
    pub capture: bool,
    /// Operator asked to restart calibration.
    #[serde(default)]
    pub restart: bool,
}

/// A decoded frame ready for the tracker.
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp_ms: u64,
    pub image_width: f64,
    pub image_height: f64,
    /// `None` when the detector found no face.
    pub landmarks: Option<LandmarkSet>,
    pub capture: bool,
    pub restart: bool,
}

impl Frame {
    /// Frame with no detection, carrying only triggers.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            image_width: 0.0,
            image_height: 0.0,
            landmarks: None,
            capture: false,
            restart: false,
        }
    }
}

impl TryFrom<FrameMessage> for Frame {
    type Error = FrameError;

    fn try_from(msg: FrameMessage) -> Result<Self, Self::Error> {
        let size_ok = |v: f64| v.is_finite() && v > 0.0;
        if msg.landmarks.is_some() && !(size_ok(msg.image_width) && size_ok(msg.image_height)) {
            return Err(FrameError::ImageSize {
                width: msg.image_width,
                height: msg.image_height,
            });
        }

        Ok(Self {
            timestamp_ms: msg.timestamp_ms,
            image_width: msg.image_width,
            image_height: msg.image_height,
            landmarks: msg.landmarks.map(LandmarkSet::from),
            capture: msg.capture,
            restart: msg.restart,
        })
    }
}

pub fn decode_frame(line: &str) -> Result<Frame, FrameError> {
    let msg: FrameMessage = serde_json::from_str(line)?;
    Frame::try_from(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_frame() {
        let frame =
            decode_frame(r#"{"timestamp_ms": 5, "image_width": 640, "image_height": 480}"#).unwrap();
        assert_eq!(frame.timestamp_ms, 5);
        assert!(frame.landmarks.is_none());
        assert!(!frame.capture);
        assert!(!frame.restart);
    }

    #[test]
    fn decodes_landmarks_and_triggers() {
        let frame = decode_frame(
            r#"{"timestamp_ms": 9, "image_width": 640, "image_height": 480,
                "landmarks": [[0.1, 0.2], [0.3, 0.4]], "capture": true}"#,
        )
        .unwrap();
        let set = frame.landmarks.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).map(|p| p.to_array()), Some([0.3, 0.4]));
        assert!(frame.capture);
    }

    #[test]
    fn rejects_bad_json_and_sizes() {
        assert!(matches!(decode_frame("{not json"), Err(FrameError::Json(_))));
        assert!(matches!(
            decode_frame(r#"{"timestamp_ms": 1, "image_width": 0, "image_height": 480, "landmarks": []}"#),
            Err(FrameError::ImageSize { .. })
        ));
    }
}
