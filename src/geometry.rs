// SPDX-License-Identifier: GPL-3.0-only

//! Preview-space geometry
//!
//! Pointer positions and the crop rectangle live in preview coordinates
//! (logical pixels of the preview surface, origin top-left). Frames are
//! letterboxed into that surface after rotation, so mapping a preview
//! rectangle back onto sensor pixels goes through [`Rectangle::to_frame`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in preview coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a surface in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if a point falls inside `[0, width] x [0, height]`
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Axis-aligned rectangle with non-negative extent
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rectangle {
    /// Create a rectangle; negative extents are treated as zero
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    /// Normalized rectangle spanning two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            x: left,
            y: top,
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Check if this rectangle contains a point (right and bottom edges exclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Clip the rectangle to `[0, bounds.width] x [0, bounds.height]`
    pub fn clamp_to(&self, bounds: Size) -> Self {
        let left = self.x.clamp(0.0, bounds.width);
        let top = self.y.clamp(0.0, bounds.height);
        let right = self.right().clamp(0.0, bounds.width);
        let bottom = self.bottom().clamp(0.0, bounds.height);
        Self::new(left, top, right - left, bottom - top)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: &Rectangle) -> Option<Rectangle> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Rectangle::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Largest rectangle with the aspect ratio of `content` centred in `bounds`
    pub fn fit(content_width: u32, content_height: u32, bounds: Size) -> Self {
        if content_width == 0 || content_height == 0 || bounds.width <= 0.0 || bounds.height <= 0.0
        {
            return Self::new(0.0, 0.0, bounds.width.max(0.0), bounds.height.max(0.0));
        }
        let scale = (bounds.width / content_width as f32).min(bounds.height / content_height as f32);
        let w = content_width as f32 * scale;
        let h = content_height as f32 * scale;
        Self::new((bounds.width - w) / 2.0, (bounds.height - h) / 2.0, w, h)
    }

    /// Map a preview-space rectangle onto pixels of the unrotated frame
    ///
    /// The frame is assumed to be shown rotated by `rotation` and letterboxed
    /// into `preview`. Parts of the rectangle outside the displayed image are
    /// discarded; `None` means nothing of the frame is covered.
    pub fn to_frame(
        &self,
        preview: Size,
        rotation: Rotation,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<PixelRect> {
        let (shown_w, shown_h) = rotation.rotated_dimensions(frame_width, frame_height);
        let content = Rectangle::fit(shown_w, shown_h, preview);
        let covered = self.intersect(&content)?;

        let u0 = (covered.x - content.x) / content.w;
        let v0 = (covered.y - content.y) / content.h;
        let u1 = (covered.right() - content.x) / content.w;
        let v1 = (covered.bottom() - content.y) / content.h;

        let (a_u, a_v) = rotation.unrotate_normalized(u0, v0);
        let (b_u, b_v) = rotation.unrotate_normalized(u1, v1);

        let fw = frame_width as f32;
        let fh = frame_height as f32;
        let left = (a_u.min(b_u) * fw).floor().clamp(0.0, fw) as u32;
        let right = (a_u.max(b_u) * fw).ceil().clamp(0.0, fw) as u32;
        let top = (a_v.min(b_v) * fh).floor().clamp(0.0, fh) as u32;
        let bottom = (a_v.max(b_v) * fh).ceil().clamp(0.0, fh) as u32;

        if right <= left || bottom <= top {
            return None;
        }
        Some(PixelRect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0}, {:.0}x{:.0})", self.x, self.y, self.w, self.h)
    }
}

/// Integer rectangle in frame pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Display rotation in quarter turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Advance by +90 degrees
    pub fn clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Go back by 90 degrees
    pub fn counter_clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg270,
            Rotation::Deg90 => Rotation::Deg0,
            Rotation::Deg180 => Rotation::Deg90,
            Rotation::Deg270 => Rotation::Deg180,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Snap an arbitrary angle to the nearest quarter turn
    pub fn from_degrees(degrees: i32) -> Self {
        let quarter = ((degrees as f32 / 90.0).round() as i32).rem_euclid(4);
        Self::ALL[quarter as usize]
    }

    /// True for 90 and 270, where width and height swap
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Dimensions of a `width x height` image after applying this rotation
    pub fn rotated_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map normalized coordinates of the rotated image back to the source image
    fn unrotate_normalized(self, u: f32, v: f32) -> (f32, f32) {
        match self {
            Rotation::Deg0 => (u, v),
            Rotation::Deg90 => (v, 1.0 - u),
            Rotation::Deg180 => (1.0 - u, 1.0 - v),
            Rotation::Deg270 => (1.0 - v, u),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rectangle::from_corners(Point::new(110.0, 60.0), Point::new(10.0, 10.0));
        assert_eq!(rect, Rectangle::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let rect = Rectangle::new(-5.0, 10.0, 15.0, 200.0).clamp_to(Size::new(200.0, 150.0));
        assert_eq!(rect, Rectangle::new(0.0, 10.0, 10.0, 140.0));
    }

    #[test]
    fn test_clamp_outside_bounds_is_empty() {
        let rect = Rectangle::new(300.0, 10.0, 20.0, 20.0).clamp_to(Size::new(200.0, 150.0));
        assert!(rect.is_empty());
    }

    #[test]
    fn test_fit_letterboxes() {
        let content = Rectangle::fit(1280, 720, Size::new(800.0, 600.0));
        assert_eq!(content.x, 0.0);
        assert_eq!(content.w, 800.0);
        assert_eq!(content.h, 450.0);
        assert_eq!(content.y, 75.0);
    }

    #[test]
    fn test_rotation_full_turn() {
        let mut rotation = Rotation::Deg0;
        for _ in 0..4 {
            rotation = rotation.clockwise();
        }
        assert_eq!(rotation, Rotation::Deg0);
        assert_eq!(Rotation::Deg0.counter_clockwise(), Rotation::Deg270);
    }

    #[test]
    fn test_from_degrees_snaps() {
        assert_eq!(Rotation::from_degrees(-90), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(100), Rotation::Deg90);
    }

    #[test]
    fn test_to_frame_identity() {
        // 400x300 frame shown 1:1 in a 400x300 preview
        let rect = Rectangle::new(100.0, 50.0, 200.0, 100.0);
        let pixels = rect
            .to_frame(Size::new(400.0, 300.0), Rotation::Deg0, 400, 300)
            .unwrap();
        assert_eq!(
            pixels,
            PixelRect {
                x: 100,
                y: 50,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_to_frame_scales_to_sensor() {
        let rect = Rectangle::new(0.0, 0.0, 200.0, 150.0);
        let pixels = rect
            .to_frame(Size::new(400.0, 300.0), Rotation::Deg0, 4000, 3000)
            .unwrap();
        assert_eq!(pixels.width, 2000);
        assert_eq!(pixels.height, 1500);
    }

    #[test]
    fn test_to_frame_rotated_clockwise() {
        // 400x200 frame rotated 90 shows as 200x400; top-left quarter of the
        // displayed image is the bottom-left quarter of the source.
        let rect = Rectangle::new(0.0, 0.0, 100.0, 200.0);
        let pixels = rect
            .to_frame(Size::new(200.0, 400.0), Rotation::Deg90, 400, 200)
            .unwrap();
        assert_eq!(
            pixels,
            PixelRect {
                x: 0,
                y: 100,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_to_frame_in_letterbox_is_none() {
        // 1280x720 in 800x600 leaves a 75px band at the top
        let rect = Rectangle::new(0.0, 0.0, 800.0, 70.0);
        assert!(
            rect.to_frame(Size::new(800.0, 600.0), Rotation::Deg0, 1280, 720)
                .is_none()
        );
    }
}
