//! Renderer seam and the asset overlay implementation.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use image::RgbaImage;
use rochambeau_types::{
    events::GameEvent,
    hud::{HudView, PhaseKind},
    moves::Move,
    vision::ImageFrame,
    Result,
};
use tracing::info;

use crate::{
    assets::{AssetKey, AssetStore},
    overlay::{blend_roi, scale, to_image, Roi},
    render_error,
};

/// Side length of the countdown glyph box, in pixels.
const COUNTDOWN_BOX: u32 = 300;
/// Side length of the gesture marker drawn at the wrist.
const HAND_MARKER: u32 = 96;

/// Draws one frame's presentation. Holds no game state.
pub trait Renderer {
    fn render(&mut self, frame: &mut ImageFrame, view: &HudView) -> Result<()>;

    fn on_event(&mut self, _event: &GameEvent) {}
}

impl<A: Renderer, B: Renderer> Renderer for (A, B) {
    fn render(&mut self, frame: &mut ImageFrame, view: &HudView) -> Result<()> {
        self.0.render(frame, view)?;
        self.1.render(frame, view)
    }

    fn on_event(&mut self, event: &GameEvent) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

/// Composites asset glyphs onto the camera frame.
pub struct OverlayRenderer {
    assets: AssetStore,
    /// Glyphs already resized to a box, keyed by asset and box size.
    scaled: HashMap<(AssetKey, u32, u32), RgbaImage>,
    capture_dir: Option<PathBuf>,
}

impl OverlayRenderer {
    pub fn new(assets: AssetStore) -> Self {
        Self {
            assets,
            scaled: HashMap::new(),
            capture_dir: None,
        }
    }

    /// Save the composited frame of every resolved round under `dir`.
    pub fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }

    fn composite(&mut self, frame: &mut ImageFrame, view: &HudView) {
        let mid = frame.width / 2;
        let left_half = Roi::new(0, 0, mid, frame.height);
        match view.phase {
            PhaseKind::Idle => self.draw(frame, AssetKey::Logo, left_half),
            PhaseKind::Countdown => {
                if let Some(stage) = view.countdown_stage {
                    let roi = Roi::centered(mid, frame.height / 2, COUNTDOWN_BOX, COUNTDOWN_BOX);
                    self.draw(frame, AssetKey::Countdown(stage), roi);
                }
            }
            PhaseKind::ResultShown => {
                if let Some(cpu) = view.cpu_move {
                    self.draw(frame, AssetKey::Glyph(cpu), left_half);
                }
            }
        }

        // Live feedback: the recognised gesture follows the player's wrist.
        if let (Some(gesture), Some(wrist)) = (view.gesture, view.wrist) {
            let (x, y) = wrist.to_px(frame.width, frame.height);
            let roi = Roi::centered(x, y, HAND_MARKER, HAND_MARKER);
            self.draw(frame, AssetKey::Glyph(gesture), roi);
        }
    }

    fn draw(&mut self, frame: &mut ImageFrame, key: AssetKey, roi: Roi) {
        if roi.width == 0 || roi.height == 0 {
            return;
        }
        let assets = &self.assets;
        let glyph = self
            .scaled
            .entry((key, roi.width, roi.height))
            .or_insert_with(|| scale(assets.get(key), roi.width, roi.height));
        blend_roi(frame, glyph, roi);
    }

    fn persist_capture(&self, dir: &Path, frame: &ImageFrame, view: &HudView) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|err| {
            render_error(format!("failed to create capture dir {}: {err}", dir.display()))
        })?;
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let cpu = view.cpu_move.map(Move::label).unwrap_or("none");
        let path = dir.join(format!("round_{:03}_{cpu}_{timestamp}.png", view.round));
        to_image(frame)?
            .save(&path)
            .map_err(|err| render_error(format!("failed to save frame: {err}")))?;
        Ok(path)
    }
}

impl Renderer for OverlayRenderer {
    fn render(&mut self, frame: &mut ImageFrame, view: &HudView) -> Result<()> {
        if frame.is_empty() {
            return Ok(());
        }
        self.composite(frame, view);
        if view.fresh_result {
            if let Some(dir) = &self.capture_dir {
                let path = self.persist_capture(dir, frame, view)?;
                info!("Saved round capture: {:?}", path);
            }
        }
        Ok(())
    }
}
