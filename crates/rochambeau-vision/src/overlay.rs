//! Alpha compositing onto RGBA frames.

use std::borrow::Cow;

use image::{
    imageops::{self, FilterType},
    ImageBuffer, Rgba, RgbaImage,
};
use rochambeau_types::{vision::ImageFrame, Result};

use crate::render_error;

/// Destination rectangle in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size centred on `(cx, cy)`, clamped at the origin.
    pub fn centered(cx: u32, cy: u32, width: u32, height: u32) -> Self {
        Self::new(
            cx.saturating_sub(width / 2),
            cy.saturating_sub(height / 2),
            width,
            height,
        )
    }
}

/// Scale `src` into `roi` and blend it over `dst` using its alpha channel.
/// Parts of the ROI outside the frame are clipped.
pub fn blend_roi(dst: &mut ImageFrame, src: &RgbaImage, roi: Roi) {
    if roi.width == 0 || roi.height == 0 || dst.is_empty() {
        return;
    }
    let scaled = if src.dimensions() == (roi.width, roi.height) {
        Cow::Borrowed(src)
    } else {
        Cow::Owned(scale(src, roi.width, roi.height))
    };

    let stride = dst.width as usize * 4;
    let x_end = roi.x.saturating_add(roi.width).min(dst.width);
    let y_end = roi.y.saturating_add(roi.height).min(dst.height);
    for y in roi.y..y_end {
        for x in roi.x..x_end {
            let Rgba([r, g, b, a]) = *scaled.get_pixel(x - roi.x, y - roi.y);
            if a == 0 {
                continue;
            }
            let alpha = f32::from(a) / 255.0;
            let idx = y as usize * stride + x as usize * 4;
            let Some(px) = dst.data.get_mut(idx..idx + 3) else {
                continue;
            };
            for (channel, fg) in px.iter_mut().zip([r, g, b]) {
                let out = alpha * f32::from(fg) + (1.0 - alpha) * f32::from(*channel);
                *channel = out.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

pub fn scale(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(src, width, height, FilterType::Triangle)
}

/// Flip the frame horizontally in place.
pub fn mirror(frame: &mut ImageFrame) -> Result<()> {
    if frame.is_empty() {
        return Ok(());
    }
    if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
        return Err(render_error("frame buffer does not match its dimensions"));
    }
    let data = std::mem::take(&mut frame.data);
    let mut buffer = ImageBuffer::<Rgba<u8>, _>::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| render_error("frame buffer does not match its dimensions"))?;
    imageops::flip_horizontal_in_place(&mut buffer);
    frame.data = buffer.into_raw();
    Ok(())
}

/// Copy a frame into an owned image buffer.
pub fn to_image(frame: &ImageFrame) -> Result<RgbaImage> {
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| render_error("frame buffer does not match its dimensions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_pixels() {
        let mut frame = ImageFrame::blank(4, 4);
        let src = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        blend_roi(&mut frame, &src, Roi::new(1, 1, 2, 2));
        assert_eq!(frame.pixel(1, 1), Some([200, 100, 50, 255]));
        assert_eq!(frame.pixel(2, 2), Some([200, 100, 50, 255]));
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(3, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn translucent_source_mixes() {
        let mut frame = ImageFrame::blank(1, 1);
        let src = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 51]));
        blend_roi(&mut frame, &src, Roi::new(0, 0, 1, 1));
        assert_eq!(frame.pixel(0, 0), Some([51, 51, 51, 255]));
    }

    #[test]
    fn roi_is_clipped_at_frame_edge() {
        let mut frame = ImageFrame::blank(3, 3);
        let src = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        blend_roi(&mut frame, &src, Roi::new(2, 2, 4, 4));
        assert_eq!(frame.pixel(2, 2), Some([9, 9, 9, 255]));
        assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn source_is_scaled_to_roi() {
        let mut frame = ImageFrame::blank(6, 6);
        let src = RgbaImage::from_pixel(1, 1, Rgba([7, 7, 7, 255]));
        blend_roi(&mut frame, &src, Roi::new(0, 0, 6, 3));
        assert_eq!(frame.pixel(5, 2), Some([7, 7, 7, 255]));
        assert_eq!(frame.pixel(5, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn mirror_flips_columns() {
        let mut frame = ImageFrame::blank(2, 1);
        frame.data[0] = 255;
        mirror(&mut frame).expect("mirror");
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(1, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn mirror_rejects_truncated_buffer() {
        let mut frame = ImageFrame::from_rgba(2, 2, vec![0; 4]);
        assert!(mirror(&mut frame).is_err());
    }

    #[test]
    fn centered_roi_clamps_at_origin() {
        assert_eq!(Roi::centered(100, 50, 300, 300), Roi::new(0, 0, 300, 300));
        assert_eq!(Roi::centered(640, 360, 300, 300), Roi::new(490, 210, 300, 300));
    }
}
