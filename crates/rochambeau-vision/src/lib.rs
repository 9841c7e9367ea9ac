//! Hand-gesture recognition and frame compositing.

pub mod assets;
pub mod classifier;
pub mod detector;
pub mod overlay;
pub mod render;

pub use assets::{AssetKey, AssetStore};
pub use classifier::{classify, FingerState};
pub use detector::{
    provider_from_config, Detection, GestureDetector, LandmarkProvider, NoHand, RecordedLandmarks,
};
pub use render::{OverlayRenderer, Renderer};

use rochambeau_types::RochambeauError;

pub fn detector_error(message: impl Into<String>) -> RochambeauError {
    RochambeauError::Detector(message.into())
}

pub fn asset_error(message: impl Into<String>) -> RochambeauError {
    RochambeauError::Asset(message.into())
}

pub fn render_error(message: impl Into<String>) -> RochambeauError {
    RochambeauError::Render(message.into())
}
