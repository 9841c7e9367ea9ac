use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use rochambeau_types::{config::CameraConfig, vision::ImageFrame, Result};
use rochambeau_vision::overlay::mirror;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{camera_error, CaptureMetrics, FrameSource};

/// Plays back a directory of PNG frames in name order, forever.
pub struct ReplayCamera {
    config: CameraConfig,
    frames: Vec<PathBuf>,
    cursor: usize,
    pacing: Option<Interval>,
    metrics: CaptureMetrics,
}

impl ReplayCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
            cursor: 0,
            pacing: None,
            metrics: CaptureMetrics::default(),
        }
    }

    fn scan(&self) -> Result<Vec<PathBuf>> {
        let dir = PathBuf::from(&self.config.frames_dir);
        let entries = fs::read_dir(&dir).map_err(|err| {
            camera_error(format!("unable to open frame source {}: {err}", dir.display()))
        })?;
        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        frames.sort();
        if frames.is_empty() {
            return Err(camera_error(format!(
                "no PNG frames found in {}",
                dir.display()
            )));
        }
        Ok(frames)
    }
}

#[async_trait]
impl FrameSource for ReplayCamera {
    async fn open(&mut self) -> Result<()> {
        self.frames = self.scan()?;
        self.cursor = 0;
        let period = Duration::from_secs_f64(1.0 / f64::from(self.config.fps.max(1)));
        let mut pacing = interval(period);
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.pacing = Some(pacing);
        info!(
            "Replay camera opened: {} frames from {} at {} fps",
            self.frames.len(),
            self.config.frames_dir,
            self.config.fps
        );
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<ImageFrame>> {
        let Some(pacing) = self.pacing.as_mut() else {
            return Err(camera_error("frame source is not open"));
        };
        pacing.tick().await;

        let sequence = self.cursor as u64;
        let path = &self.frames[self.cursor % self.frames.len()];
        self.cursor = self.cursor.wrapping_add(1);

        let decoded = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                warn!("skipping unreadable frame {}: {err}", path.display());
                self.metrics.dropped += 1;
                return Ok(None);
            }
        };
        let (width, height) = decoded.dimensions();
        let mut frame =
            ImageFrame::from_rgba(width, height, decoded.into_raw()).with_sequence(sequence);
        if self.config.mirror {
            mirror(&mut frame)?;
        }
        self.metrics.delivered += 1;
        Ok(Some(frame))
    }

    async fn release(&mut self) {
        if self.pacing.take().is_some() {
            info!(
                "Replay camera released after {} frames ({} dropped)",
                self.metrics.delivered, self.metrics.dropped
            );
        }
    }

    fn metrics(&self) -> CaptureMetrics {
        self.metrics
    }
}

/// Synthetic camera producing blank frames, for tests and dry runs.
pub struct MockCamera {
    width: u32,
    height: u32,
    /// Delivery pattern, cycled; `false` drops that tick's frame.
    script: Vec<bool>,
    fail_open: bool,
    opened: bool,
    sequence: u64,
    released: Arc<AtomicBool>,
    metrics: CaptureMetrics,
}

impl MockCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            script: Vec::new(),
            fail_open: false,
            opened: false,
            sequence: 0,
            released: Arc::new(AtomicBool::new(false)),
            metrics: CaptureMetrics::default(),
        }
    }

    pub fn with_script(mut self, script: Vec<bool>) -> Self {
        self.script = script;
        self
    }

    /// Simulate an unavailable device.
    pub fn unavailable(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Flag that flips to `true` once the camera has been released.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

#[async_trait]
impl FrameSource for MockCamera {
    async fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(camera_error("mock camera unavailable"));
        }
        info!("Mock camera opened at {}x{}", self.width, self.height);
        self.opened = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<ImageFrame>> {
        if !self.opened {
            return Err(camera_error("frame source is not open"));
        }
        let sequence = self.sequence;
        self.sequence += 1;
        let deliver = if self.script.is_empty() {
            true
        } else {
            self.script[(sequence as usize) % self.script.len()]
        };
        if !deliver {
            debug!("Mock camera dropping frame {}", sequence);
            self.metrics.dropped += 1;
            return Ok(None);
        }
        self.metrics.delivered += 1;
        Ok(Some(
            ImageFrame::blank(self.width, self.height).with_sequence(sequence),
        ))
    }

    async fn release(&mut self) {
        self.opened = false;
        self.released.store(true, Ordering::SeqCst);
    }

    fn metrics(&self) -> CaptureMetrics {
        self.metrics
    }
}
