// SPDX-License-Identifier: GPL-3.0-only

//! Frame types shared by the camera session and the preview

use crate::geometry::PixelRect;
use gstreamer::buffer::{MappedBuffer, Readable};
use image::RgbaImage;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Frame data storage - either pre-copied bytes or zero-copy GStreamer buffer
///
/// The `Mapped` variant keeps the GStreamer buffer mapped and alive until
/// all references are dropped.
#[derive(Clone)]
pub enum FrameData {
    /// Pre-copied bytes (stills, tests)
    Copied(Arc<[u8]>),
    /// Zero-copy mapped GStreamer buffer
    Mapped(Arc<MappedBuffer<Readable>>),
}

impl FrameData {
    /// Create FrameData from a mapped GStreamer buffer (zero-copy)
    pub fn from_mapped_buffer(buffer: MappedBuffer<Readable>) -> Self {
        FrameData::Mapped(Arc::new(buffer))
    }

    pub fn len(&self) -> usize {
        match self {
            FrameData::Copied(data) => data.len(),
            FrameData::Mapped(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Copied(data) => write!(f, "FrameData::Copied({} bytes)", data.len()),
            FrameData::Mapped(buf) => write!(f, "FrameData::Mapped({} bytes)", buf.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Copied(data) => data.as_ref(),
            FrameData::Mapped(buf) => buf.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

/// One RGBA frame delivered by the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, rows `stride` bytes apart
    pub data: FrameData,
    /// Bytes per row, may include padding
    pub stride: u32,
    /// When the frame left the pipeline
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed frame from an RGBA image
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            stride: image.width() * 4,
            data: FrameData::Copied(Arc::from(image.as_raw().as_slice())),
            captured_at: Instant::now(),
        }
    }

    /// Copy the frame into an owned image, dropping row padding
    ///
    /// Returns `None` when the buffer is shorter than the declared geometry.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let row_bytes = self.width as usize * 4;
        let stride = self.stride as usize;
        if self.width == 0 || self.height == 0 || stride < row_bytes {
            return None;
        }
        let needed = stride * (self.height as usize - 1) + row_bytes;
        if self.data.len() < needed {
            return None;
        }

        if stride == row_bytes {
            return RgbaImage::from_raw(
                self.width,
                self.height,
                self.data[..row_bytes * self.height as usize].to_vec(),
            );
        }

        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.data.chunks(stride).take(self.height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
        RgbaImage::from_raw(self.width, self.height, pixels)
    }

    /// Copy only the rows and columns covered by `region`
    ///
    /// Returns `None` when the region is empty, leaves the frame, or the
    /// buffer is shorter than the declared geometry.
    pub fn crop_rgba(&self, region: PixelRect) -> Option<RgbaImage> {
        if region.width == 0
            || region.height == 0
            || region.x.checked_add(region.width)? > self.width
            || region.y.checked_add(region.height)? > self.height
        {
            return None;
        }

        let stride = self.stride as usize;
        let start = region.x as usize * 4;
        let row_bytes = region.width as usize * 4;
        let last_row = (region.y + region.height - 1) as usize;
        if self.data.len() < last_row * stride + start + row_bytes {
            return None;
        }

        let mut pixels = Vec::with_capacity(row_bytes * region.height as usize);
        for row in region.y as usize..=last_row {
            let offset = row * stride + start;
            pixels.extend_from_slice(&self.data[offset..offset + row_bytes]);
        }
        RgbaImage::from_raw(region.width, region.height, pixels)
    }
}

/// Single-slot mailbox holding the newest frame
///
/// Streaming threads overwrite the slot; the UI reads it on its own
/// schedule. Frames replaced before they are read are dropped.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Arc<CameraFrame>>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, frame: CameraFrame) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(Arc::new(frame)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::new(frame)),
        }
    }

    pub fn latest(&self) -> Option<Arc<CameraFrame>> {
        match self.slot.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_rows_are_stripped() {
        // 2x2 frame with 4 bytes of padding per row
        let mut data = Vec::new();
        data.extend_from_slice(&[1, 1, 1, 255, 2, 2, 2, 255, 0, 0, 0, 0]);
        data.extend_from_slice(&[3, 3, 3, 255, 4, 4, 4, 255]);
        let frame = CameraFrame {
            width: 2,
            height: 2,
            stride: 12,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            captured_at: Instant::now(),
        };

        let image = frame.to_rgba_image().unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [2, 2, 2, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [3, 3, 3, 255]);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = CameraFrame {
            width: 4,
            height: 4,
            stride: 16,
            data: FrameData::Copied(Arc::from(vec![0u8; 20].as_slice())),
            captured_at: Instant::now(),
        };
        assert!(frame.to_rgba_image().is_none());
    }

    #[test]
    fn test_region_copy_reads_only_covered_pixels() {
        // 3x2 frame with 4 bytes of padding per row
        let mut data = Vec::new();
        data.extend_from_slice(&[1, 1, 1, 255, 2, 2, 2, 255, 3, 3, 3, 255, 0, 0, 0, 0]);
        data.extend_from_slice(&[4, 4, 4, 255, 5, 5, 5, 255, 6, 6, 6, 255]);
        let frame = CameraFrame {
            width: 3,
            height: 2,
            stride: 16,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            captured_at: Instant::now(),
        };

        let region = PixelRect {
            x: 1,
            y: 0,
            width: 2,
            height: 2,
        };
        let image = frame.crop_rgba(region).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [2, 2, 2, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [6, 6, 6, 255]);

        let outside = PixelRect {
            x: 2,
            y: 1,
            width: 2,
            height: 1,
        };
        assert!(frame.crop_rgba(outside).is_none());
    }

    #[test]
    fn test_latest_frame_overwrites() {
        let slot = LatestFrame::new();
        assert!(slot.latest().is_none());
        slot.store(CameraFrame::from_rgba_image(&RgbaImage::new(1, 1)));
        slot.store(CameraFrame::from_rgba_image(&RgbaImage::new(2, 2)));
        assert_eq!(slot.latest().map(|f| f.width), Some(2));
        slot.clear();
        assert!(slot.latest().is_none());
    }
}
