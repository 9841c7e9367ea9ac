//! Landmark providers and the per-frame gesture detector.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use rochambeau_types::{
    config::DetectorConfig,
    hand::{HandObservation, Handedness, Landmark},
    moves::Move,
    vision::ImageFrame,
    Result,
};
use tracing::{debug, info, warn};

use crate::{classifier::FingerState, detector_error};

/// Finds at most one hand in a frame.
pub trait LandmarkProvider: Send {
    fn detect(&mut self, frame: &ImageFrame) -> Result<Option<HandObservation>>;
}

/// Provider that never sees a hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHand;

impl LandmarkProvider for NoHand {
    fn detect(&mut self, _frame: &ImageFrame) -> Result<Option<HandObservation>> {
        Ok(None)
    }
}

/// Replays a recording of detector output, one JSON value per line
/// (`null` for frames without a hand), looping at the end.
///
/// A hand must reach the detection threshold to be picked up; while it stays
/// in view from frame to frame the lower tracking threshold applies.
pub struct RecordedLandmarks {
    observations: Vec<Option<HandObservation>>,
    cursor: usize,
    min_detection: f32,
    min_tracking: f32,
    tracking: bool,
}

impl RecordedLandmarks {
    pub fn new(observations: Vec<Option<HandObservation>>, min_detection: f32) -> Self {
        Self {
            observations,
            cursor: 0,
            min_detection,
            min_tracking: min_detection,
            tracking: false,
        }
    }

    pub fn with_tracking_confidence(mut self, min_tracking: f32) -> Self {
        self.min_tracking = min_tracking;
        self
    }

    pub fn from_reader<R: BufRead>(reader: R, min_confidence: f32) -> Result<Self> {
        let mut observations = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|err| detector_error(format!("failed to read recording: {err}")))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let obs: Option<HandObservation> = serde_json::from_str(trimmed).map_err(|err| {
                detector_error(format!("invalid observation on line {}: {err}", lineno + 1))
            })?;
            observations.push(obs);
        }
        if observations.is_empty() {
            return Err(detector_error("landmark recording is empty"));
        }
        Ok(Self::new(observations, min_confidence))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, min_confidence: f32) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            detector_error(format!("unable to open recording {}: {err}", path.display()))
        })?;
        let recording = Self::from_reader(BufReader::new(file), min_confidence)?;
        info!(
            "Loaded {} recorded observations from {}",
            recording.len(),
            path.display()
        );
        Ok(recording)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl LandmarkProvider for RecordedLandmarks {
    fn detect(&mut self, _frame: &ImageFrame) -> Result<Option<HandObservation>> {
        if self.observations.is_empty() {
            return Ok(None);
        }
        let obs = self.observations[self.cursor % self.observations.len()].clone();
        self.cursor = self.cursor.wrapping_add(1);
        let threshold = if self.tracking {
            self.min_tracking
        } else {
            self.min_detection
        };
        let accepted = obs.filter(|o| o.score >= threshold);
        self.tracking = accepted.is_some();
        Ok(accepted)
    }
}

/// Build the provider described by the detector section of the config.
pub fn provider_from_config(config: &DetectorConfig) -> Result<Box<dyn LandmarkProvider>> {
    match &config.landmarks_path {
        Some(path) => {
            let recording = RecordedLandmarks::from_file(path, config.min_detection_confidence)?
                .with_tracking_confidence(config.min_tracking_confidence);
            Ok(Box::new(recording))
        }
        None => {
            info!("No landmark recording configured; hands will not be detected");
            Ok(Box::new(NoHand))
        }
    }
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect(&mut self, frame: &ImageFrame) -> Result<Option<HandObservation>> {
        (**self).detect(frame)
    }
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for &mut P {
    fn detect(&mut self, frame: &ImageFrame) -> Result<Option<HandObservation>> {
        (**self).detect(frame)
    }
}

/// What was recognised in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub gesture: Option<Move>,
    pub handedness: Option<Handedness>,
    /// Normalized wrist position.
    pub wrist: Option<Landmark>,
}

/// Runs a landmark provider and the classifier over frames.
pub struct GestureDetector<P> {
    provider: P,
}

impl<P: LandmarkProvider> GestureDetector<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Never fails: provider errors are logged and read as "no hand".
    pub fn detect(&mut self, frame: &ImageFrame) -> Detection {
        let hand = match self.provider.detect(frame) {
            Ok(hand) => hand,
            Err(err) => {
                warn!("landmark provider failed on frame {}: {err}", frame.sequence);
                None
            }
        };
        let Some(hand) = hand else {
            return Detection::default();
        };
        let fingers = FingerState::measure(&hand.landmarks, hand.handedness);
        let gesture = fingers.gesture();
        debug!(
            frame = frame.sequence,
            fingers = ?fingers.0,
            gesture = ?gesture,
            "hand classified"
        );
        Detection {
            gesture,
            handedness: Some(hand.handedness),
            wrist: Some(hand.landmarks.wrist()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fixtures::right_hand;
    use rochambeau_types::{hand::HandObservation, RochambeauError};

    fn observation(fingers: [bool; 5], score: f32) -> HandObservation {
        HandObservation {
            handedness: Handedness::Right,
            landmarks: right_hand(fingers),
            score,
        }
    }

    fn recording_text(items: &[Option<HandObservation>]) -> String {
        items
            .iter()
            .map(|o| serde_json::to_string(o).expect("serialize observation"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn recording_replays_and_loops() {
        let text = recording_text(&[
            Some(observation([false; 5], 0.9)),
            None,
            Some(observation([true; 5], 0.9)),
        ]);
        let mut provider =
            RecordedLandmarks::from_reader(text.as_bytes(), 0.5).expect("parse recording");
        assert_eq!(provider.len(), 3);
        let frame = ImageFrame::empty();
        let mut detector = GestureDetector::new(&mut provider);
        let seen: Vec<Option<Move>> = (0..4).map(|_| detector.detect(&frame).gesture).collect();
        assert_eq!(
            seen,
            vec![Some(Move::Rock), None, Some(Move::Paper), Some(Move::Rock)]
        );
    }

    #[test]
    fn low_confidence_hands_are_dropped() {
        let mut provider =
            RecordedLandmarks::new(vec![Some(observation([true; 5], 0.3))], 0.7);
        let hand = provider.detect(&ImageFrame::empty()).expect("detect");
        assert!(hand.is_none());
    }

    #[test]
    fn tracked_hands_use_the_lower_threshold() {
        let weak = || Some(observation([false; 5], 0.6));
        let mut provider = RecordedLandmarks::new(
            vec![weak(), Some(observation([false; 5], 0.8)), weak(), None, weak()],
            0.7,
        )
        .with_tracking_confidence(0.5);
        let frame = ImageFrame::empty();
        let seen: Vec<bool> = (0..5)
            .map(|_| provider.detect(&frame).expect("detect").is_some())
            .collect();
        assert_eq!(seen, vec![false, true, true, false, false]);
    }

    #[test]
    fn provider_from_config_applies_both_thresholds() {
        let path = std::env::temp_dir().join("rochambeau-landmarks-thresholds.ndjson");
        let lines = recording_text(&[
            Some(observation([false; 5], 0.9)),
            Some(observation([false; 5], 0.65)),
            None,
            Some(observation([false; 5], 0.65)),
        ]);
        std::fs::write(&path, lines).expect("write recording");
        let config = DetectorConfig {
            landmarks_path: Some(path.display().to_string()),
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.6,
        };
        let mut provider = provider_from_config(&config).expect("provider");
        let frame = ImageFrame::empty();
        let seen: Vec<bool> = (0..4)
            .map(|_| provider.detect(&frame).expect("detect").is_some())
            .collect();
        assert_eq!(seen, vec![true, true, false, false]);
        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn blank_lines_are_skipped_and_garbage_rejected() {
        let text = format!("\n{}\n\n", recording_text(&[None]));
        let provider = RecordedLandmarks::from_reader(text.as_bytes(), 0.5).expect("parse");
        assert_eq!(provider.len(), 1);

        let err = RecordedLandmarks::from_reader("{not json".as_bytes(), 0.5)
            .err()
            .expect("garbage rejected");
        assert!(matches!(err, RochambeauError::Detector(_)));
        assert!(RecordedLandmarks::from_reader("".as_bytes(), 0.5).is_err());
    }

    struct Failing;

    impl LandmarkProvider for Failing {
        fn detect(&mut self, _frame: &ImageFrame) -> Result<Option<HandObservation>> {
            Err(detector_error("model crashed"))
        }
    }

    #[test]
    fn provider_errors_read_as_no_hand() {
        let mut detector = GestureDetector::new(Failing);
        assert_eq!(detector.detect(&ImageFrame::empty()), Detection::default());
    }

    #[test]
    fn detection_reports_hand_details() {
        let scissors = observation([false, true, true, false, false], 1.0);
        let mut detector = GestureDetector::new(RecordedLandmarks::new(vec![Some(scissors)], 0.5));
        let detection = detector.detect(&ImageFrame::empty());
        assert_eq!(detection.gesture, Some(Move::Scissors));
        assert_eq!(detection.handedness, Some(Handedness::Right));
        assert_eq!(detection.wrist, Some(Landmark::new(0.5, 0.9)));
    }
}
