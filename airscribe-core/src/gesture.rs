//! Discrete gesture classification from a single hand frame.

use serde::{Deserialize, Serialize};

use crate::config::{GestureConfig, GestureStrategy};
use crate::landmark::{Finger, HandFrame, INDEX_TIP, THUMB_TIP};

/// A recognized hand pose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    /// Index finger extended, others not.
    Pointing,
    /// All four fingers curled down.
    Fist,
    /// Anything else, including ambiguous or partially tracked poses.
    #[default]
    Neutral,
}

/// Vertical state of one finger relative to its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FingerState {
    Extended,
    Down,
    Unknown,
}

/// Stateless pose classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    /// Create a classifier with the given configuration.
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Classify a frame.
    #[must_use]
    pub fn classify(&self, frame: &HandFrame) -> Gesture {
        match self.config.strategy {
            GestureStrategy::FingerPose => self.classify_pose(frame),
            GestureStrategy::Pinch => self.classify_pinch(frame),
        }
    }

    fn classify_pose(&self, frame: &HandFrame) -> Gesture {
        let [index, middle, ring, pinky] = Finger::ALL.map(|f| self.finger_state(frame, f));

        if [index, middle, ring, pinky]
            .iter()
            .all(|s| *s == FingerState::Down)
        {
            return Gesture::Fist;
        }

        let others_extended = [middle, ring, pinky]
            .iter()
            .any(|s| *s == FingerState::Extended);
        if index == FingerState::Extended && !others_extended {
            return Gesture::Pointing;
        }

        Gesture::Neutral
    }

    fn classify_pinch(&self, frame: &HandFrame) -> Gesture {
        match (frame.landmark(THUMB_TIP), frame.landmark(INDEX_TIP)) {
            (Some(thumb), Some(index))
                if thumb.planar_distance(&index) < self.config.pinch_threshold =>
            {
                Gesture::Pointing
            }
            _ => Gesture::Neutral,
        }
    }

    fn finger_state(&self, frame: &HandFrame, finger: Finger) -> FingerState {
        let Some((tip, base)) = frame.finger(finger) else {
            return FingerState::Unknown;
        };
        let threshold = self.config.extension_threshold;
        if base.y - tip.y > threshold {
            FingerState::Extended
        } else if tip.y - base.y > threshold {
            FingerState::Down
        } else {
            FingerState::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LANDMARK_COUNT};

    /// Build a frame where each finger's tip sits `offset` above (positive)
    /// or below (negative) its base at y = 0.5.
    fn frame_with_offsets(offsets: [f32; 4]) -> HandFrame {
        let mut landmarks = vec![Landmark::new(0.5, 0.6, 0.0); LANDMARK_COUNT];
        for (finger, offset) in Finger::ALL.iter().zip(offsets) {
            let (tip, base) = finger.landmarks();
            landmarks[base] = Landmark::new(0.5, 0.5, 0.0);
            landmarks[tip] = Landmark::new(0.5, 0.5 - offset, 0.0);
        }
        HandFrame::new(landmarks, 0)
    }

    #[test]
    fn test_pointing() {
        let classifier = GestureClassifier::default();
        let frame = frame_with_offsets([0.06, -0.08, -0.08, -0.08]);
        assert_eq!(classifier.classify(&frame), Gesture::Pointing);
    }

    #[test]
    fn test_pointing_with_relaxed_others() {
        // Others neither extended nor clearly down still allow pointing
        let classifier = GestureClassifier::default();
        let frame = frame_with_offsets([0.2, 0.01, 0.0, -0.02]);
        assert_eq!(classifier.classify(&frame), Gesture::Pointing);
    }

    #[test]
    fn test_fist() {
        let classifier = GestureClassifier::default();
        let frame = frame_with_offsets([-0.1, -0.1, -0.1, -0.1]);
        assert_eq!(classifier.classify(&frame), Gesture::Fist);
    }

    #[test]
    fn test_open_hand_is_neutral() {
        let classifier = GestureClassifier::default();
        let frame = frame_with_offsets([0.1, 0.1, 0.1, 0.1]);
        assert_eq!(classifier.classify(&frame), Gesture::Neutral);
    }

    #[test]
    fn test_below_threshold_is_neutral() {
        let classifier = GestureClassifier::default();
        let frame = frame_with_offsets([0.04, -0.1, -0.1, -0.1]);
        assert_eq!(classifier.classify(&frame), Gesture::Neutral);
    }

    #[test]
    fn test_missing_finger_blocks_fist() {
        let classifier = GestureClassifier::default();
        let mut frame = frame_with_offsets([-0.1, -0.1, -0.1, -0.1]);
        frame.landmarks.truncate(17);
        assert_eq!(classifier.classify(&frame), Gesture::Neutral);
    }

    #[test]
    fn test_missing_pinky_still_points() {
        let classifier = GestureClassifier::default();
        let mut frame = frame_with_offsets([0.1, -0.1, -0.1, 0.3]);
        frame.landmarks[20].x = f32::INFINITY;
        assert_eq!(classifier.classify(&frame), Gesture::Pointing);
    }

    #[test]
    fn test_empty_frame_is_neutral() {
        let classifier = GestureClassifier::default();
        assert_eq!(
            classifier.classify(&HandFrame::new(Vec::new(), 0)),
            Gesture::Neutral
        );
    }

    #[test]
    fn test_pinch_strategy() {
        let classifier = GestureClassifier::new(GestureConfig {
            strategy: GestureStrategy::Pinch,
            ..GestureConfig::default()
        });
        let mut frame = frame_with_offsets([-0.1, -0.1, -0.1, -0.1]);
        frame.landmarks[THUMB_TIP] = Landmark::new(0.52, 0.6, 0.0);
        frame.landmarks[INDEX_TIP] = Landmark::new(0.5, 0.58, 0.0);
        assert_eq!(classifier.classify(&frame), Gesture::Pointing);

        frame.landmarks[THUMB_TIP] = Landmark::new(0.7, 0.7, 0.0);
        assert_eq!(classifier.classify(&frame), Gesture::Neutral);
    }
}
