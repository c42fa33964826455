// SPDX-License-Identifier: GPL-3.0-only

//! Still post-processing
//!
//! Stills are stored in sensor orientation; the display rotation only
//! affects how the crop drawn on the preview maps back onto the sensor.

use crate::errors::CaptureError;
use crate::model::CaptureRequest;
use image::{RgbaImage, imageops};
use tracing::debug;

/// Apply the request's crop to a captured still
///
/// A crop that covers nothing of the displayed frame (e.g. drawn entirely
/// in the letterbox) is an error rather than a silently uncropped photo.
pub fn apply_crop(image: RgbaImage, request: &CaptureRequest) -> Result<RgbaImage, CaptureError> {
    let Some(crop) = request.crop_rect else {
        return Ok(image);
    };

    let region = crop
        .to_frame(
            request.preview_size,
            request.rotation,
            image.width(),
            image.height(),
        )
        .ok_or(CaptureError::EmptyCrop)?;

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "Cropping still"
    );
    Ok(imageops::crop_imm(&image, region.x, region.y, region.width, region.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rectangle, Rotation, Size};
    use crate::model::{CaptureFormat, Resolution};

    fn request(crop_rect: Option<Rectangle>, rotation: Rotation) -> CaptureRequest {
        CaptureRequest {
            format: CaptureFormat::Png,
            crop_rect,
            resolution: Resolution::new(400, 300),
            preview_size: Size::new(200.0, 150.0),
            rotation,
        }
    }

    #[test]
    fn test_no_crop_passes_through() {
        let image = RgbaImage::new(400, 300);
        let out = apply_crop(image, &request(None, Rotation::Deg0)).unwrap();
        assert_eq!(out.dimensions(), (400, 300));
    }

    #[test]
    fn test_crop_scales_from_preview() {
        let image = RgbaImage::new(400, 300);
        let crop = Rectangle::new(10.0, 10.0, 100.0, 50.0);
        let out = apply_crop(image, &request(Some(crop), Rotation::Deg0)).unwrap();
        assert_eq!(out.dimensions(), (200, 100));
    }

    #[test]
    fn test_crop_under_half_turn_picks_opposite_corner() {
        let mut image = RgbaImage::new(400, 300);
        image.put_pixel(399, 299, image::Rgba([255, 0, 0, 255]));
        // Top-left of the displayed (180 rotated) image is the source bottom-right
        let crop = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let out = apply_crop(image, &request(Some(crop), Rotation::Deg180)).unwrap();
        let (width, height) = out.dimensions();
        assert!(width <= 3 && height <= 3);
        assert_eq!(out.get_pixel(width - 1, height - 1).0, [255, 0, 0, 255]);
    }
}
