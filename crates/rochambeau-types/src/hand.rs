use serde::{Deserialize, Serialize};

/// Number of keypoints reported per hand by the landmark detector.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical keypoint indices, fixed by the upstream detector.
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Normalized image-space point. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position in a frame of the given size, clamped to the frame.
    pub fn to_px(self, width: u32, height: u32) -> (u32, u32) {
        (
            (self.x.clamp(0.0, 1.0) * width as f32) as u32,
            (self.y.clamp(0.0, 1.0) * height as f32) as u32,
        )
    }
}

/// Handedness label as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// The 21 keypoints of a single detected hand, in detector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[landmarks::WRIST]
    }
}

impl Default for HandLandmarks {
    fn default() -> Self {
        Self::new([Landmark::default(); LANDMARK_COUNT])
    }
}

fn full_confidence() -> f32 {
    1.0
}

/// One hand found in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks: HandLandmarks,
    #[serde(default = "full_confidence")]
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_score_defaults_to_full_confidence() {
        let mut points = String::from("[");
        for i in 0..LANDMARK_COUNT {
            if i > 0 {
                points.push(',');
            }
            points.push_str(r#"{"x":0.5,"y":0.5}"#);
        }
        points.push(']');
        let doc = format!(r#"{{"handedness":"Left","landmarks":{{"points":{points}}}}}"#);
        let obs: HandObservation = serde_json::from_str(&doc).expect("parse observation");
        assert_eq!(obs.handedness, Handedness::Left);
        assert_eq!(obs.score, 1.0);
        assert_eq!(obs.landmarks.wrist(), Landmark::new(0.5, 0.5));
    }

    #[test]
    fn pixel_positions_are_clamped() {
        assert_eq!(Landmark::new(1.4, 0.25).to_px(200, 100), (200, 25));
        assert_eq!(Landmark::new(-0.1, 0.5).to_px(200, 100), (0, 50));
    }
}
