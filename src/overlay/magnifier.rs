// SPDX-License-Identifier: GPL-3.0-only

//! Magnifier window following the pointer

use crate::backends::camera::CameraFrame;
use crate::constants::magnifier;
use crate::geometry::{Point, Rectangle, Rotation, Size};
use image::{RgbaImage, imageops};

/// Where the magnifier is drawn and what it shows, in preview coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagnifierLayout {
    /// Window on the preview surface
    pub window: Rectangle,
    /// Region of the displayed image being magnified
    pub source: Rectangle,
}

/// Magnifier geometry settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Magnifier {
    pub window_size: f32,
    pub zoom: f32,
    pub offset: f32,
}

impl Default for Magnifier {
    fn default() -> Self {
        Self {
            window_size: magnifier::WINDOW_SIZE,
            zoom: magnifier::DEFAULT_ZOOM,
            offset: magnifier::POINTER_OFFSET,
        }
    }
}

impl Magnifier {
    pub fn with_zoom(zoom: f32) -> Self {
        Self {
            zoom: zoom.max(1.0),
            ..Self::default()
        }
    }

    /// Place the window next to `pointer` and pick the magnified region
    ///
    /// The window sits at pointer + offset and flips to the other side of
    /// the pointer when it would leave `bounds`. The source square is
    /// centred on the pointer and shifted to stay inside `content`, the
    /// part of the surface covered by the frame. Returns `None` when the
    /// pointer is outside the surface or the content is empty.
    pub fn layout(&self, pointer: Point, bounds: Size, content: Rectangle) -> Option<MagnifierLayout> {
        if !bounds.contains(pointer) || content.is_empty() {
            return None;
        }

        let size = self.window_size.min(bounds.width).min(bounds.height);
        let x = place_axis(pointer.x, self.offset, size, bounds.width);
        let y = place_axis(pointer.y, self.offset, size, bounds.height);
        let window = Rectangle::new(x, y, size, size);

        let side = self.window_size / self.zoom;
        let source_w = side.min(content.w);
        let source_h = side.min(content.h);
        let source_x = (pointer.x - source_w / 2.0).clamp(content.x, content.right() - source_w);
        let source_y = (pointer.y - source_h / 2.0).clamp(content.y, content.bottom() - source_h);
        let source = Rectangle::new(source_x, source_y, source_w, source_h);

        Some(MagnifierLayout { window, source })
    }

    /// Sample the magnified region from the full-resolution frame
    ///
    /// Nearest-neighbour scaling keeps individual sensor pixels visible.
    pub fn render(
        &self,
        frame: &CameraFrame,
        layout: &MagnifierLayout,
        preview: Size,
        rotation: Rotation,
    ) -> Option<RgbaImage> {
        let region = layout
            .source
            .to_frame(preview, rotation, frame.width, frame.height)?;
        let cropped = frame.crop_rgba(region)?;
        let rotated = rotate(&cropped, rotation);

        let width = layout.window.w.round().max(1.0) as u32;
        let height = layout.window.h.round().max(1.0) as u32;
        Some(imageops::resize(
            &rotated,
            width,
            height,
            imageops::FilterType::Nearest,
        ))
    }
}

/// Position along one axis: after the pointer, else before it, else clamped
fn place_axis(pointer: f32, offset: f32, size: f32, extent: f32) -> f32 {
    let after = pointer + offset;
    if after + size <= extent {
        return after;
    }
    let before = pointer - offset - size;
    if before >= 0.0 {
        return before;
    }
    (extent - size).max(0.0)
}

/// Rotate an image clockwise by `rotation`
pub fn rotate(image: &RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::Deg0 => image.clone(),
        Rotation::Deg90 => imageops::rotate90(image),
        Rotation::Deg180 => imageops::rotate180(image),
        Rotation::Deg270 => imageops::rotate270(image),
    }
}
