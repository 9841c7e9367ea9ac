//! Frame acquisition and player input.

pub mod camera;
pub mod input;

use async_trait::async_trait;
use rochambeau_types::{vision::ImageFrame, Result, RochambeauError};

pub use camera::{MockCamera, ReplayCamera};
pub use input::{command_for_key, Autopilot, CommandSource, ScriptedCommands};

/// Aggregated capture counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMetrics {
    pub delivered: u64,
    pub dropped: u64,
}

/// Lazy, unbounded sequence of camera frames.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Acquire the device. Failure here is fatal.
    async fn open(&mut self) -> Result<()>;
    /// Next frame, or `None` when nothing was delivered this tick.
    async fn next_frame(&mut self) -> Result<Option<ImageFrame>>;
    /// Give the device back. Safe to call more than once.
    async fn release(&mut self);
    fn metrics(&self) -> CaptureMetrics;
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    async fn open(&mut self) -> Result<()> {
        (**self).open().await
    }

    async fn next_frame(&mut self) -> Result<Option<ImageFrame>> {
        (**self).next_frame().await
    }

    async fn release(&mut self) {
        (**self).release().await
    }

    fn metrics(&self) -> CaptureMetrics {
        (**self).metrics()
    }
}

pub fn camera_error(message: impl Into<String>) -> RochambeauError {
    RochambeauError::Camera(message.into())
}
