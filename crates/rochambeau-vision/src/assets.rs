//! Static glyphs drawn by the overlay renderer.

use std::{collections::HashMap, path::Path};

use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;
use rochambeau_types::{config::AssetConfig, moves::Move, Result};
use tracing::{info, warn};

use crate::asset_error;

/// Symbolic name of an image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Logo,
    /// Countdown glyph for 3, 2 or 1.
    Countdown(u8),
    Glyph(Move),
}

impl AssetKey {
    pub const ALL: [AssetKey; 7] = [
        AssetKey::Logo,
        AssetKey::Countdown(1),
        AssetKey::Countdown(2),
        AssetKey::Countdown(3),
        AssetKey::Glyph(Move::Rock),
        AssetKey::Glyph(Move::Paper),
        AssetKey::Glyph(Move::Scissors),
    ];

    pub fn file_name(self) -> String {
        match self {
            AssetKey::Logo => "logo.png".into(),
            AssetKey::Countdown(n) => format!("{n}.png"),
            AssetKey::Glyph(Move::Rock) => "rock.png".into(),
            AssetKey::Glyph(Move::Paper) => "paper.png".into(),
            AssetKey::Glyph(Move::Scissors) => "scissors.png".into(),
        }
    }
}

/// Translucent magenta checkerboard standing in for a missing asset.
static PLACEHOLDER: Lazy<RgbaImage> = Lazy::new(|| {
    RgbaImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 0, 255, 160])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
});

pub fn placeholder() -> &'static RgbaImage {
    &PLACEHOLDER
}

#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    images: HashMap<AssetKey, RgbaImage>,
}

impl AssetStore {
    /// Load every asset. In strict mode the first failure aborts; otherwise
    /// failures are logged and the placeholder is used.
    pub fn load(config: &AssetConfig) -> Result<Self> {
        let dir = Path::new(&config.dir);
        let mut images = HashMap::new();
        for key in AssetKey::ALL {
            match load_image(&dir.join(key.file_name())) {
                Ok(img) => {
                    images.insert(key, img);
                }
                Err(err) if config.strict => return Err(err),
                Err(err) => warn!("{err}; using placeholder for {key:?}"),
            }
        }
        info!(
            "Loaded {}/{} assets from {}",
            images.len(),
            AssetKey::ALL.len(),
            dir.display()
        );
        Ok(Self { images })
    }

    pub fn insert(&mut self, key: AssetKey, image: RgbaImage) {
        self.images.insert(key, image);
    }

    pub fn get(&self, key: AssetKey) -> &RgbaImage {
        self.images.get(&key).unwrap_or_else(|| placeholder())
    }

    pub fn contains(&self, key: AssetKey) -> bool {
        self.images.contains_key(&key)
    }
}

fn load_image(path: &Path) -> Result<RgbaImage> {
    if !path.is_file() {
        return Err(asset_error(format!("asset not found: {}", path.display())));
    }
    let img = image::open(path)
        .map_err(|err| asset_error(format!("failed to decode {}: {err}", path.display())))?;
    Ok(img.to_rgba8())
}
