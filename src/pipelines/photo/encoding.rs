// SPDX-License-Identifier: GPL-3.0-only

//! Still image encoding
//!
//! - JPEG (with quality control)
//! - PNG and TIFF (lossless)
//! - DNG for the raw format choice

use crate::errors::CaptureError;
use crate::model::CaptureFormat;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use tracing::{debug, info};

/// Metadata written into DNG files
#[derive(Debug, Clone, Default)]
pub struct CameraMetadata {
    /// libcamera camera name, if one was selected
    pub camera_name: Option<String>,
    /// Lens position in dioptres at capture time
    pub lens_position: Option<f32>,
}

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: CaptureFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
pub struct PhotoEncoder {
    format: CaptureFormat,
    jpeg_quality: u8,
    camera_metadata: CameraMetadata,
}

impl PhotoEncoder {
    pub fn new(format: CaptureFormat, jpeg_quality: u8) -> Self {
        Self {
            format,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            camera_metadata: CameraMetadata::default(),
        }
    }

    /// Set camera metadata for DNG encoding
    pub fn set_camera_metadata(&mut self, metadata: CameraMetadata) {
        self.camera_metadata = metadata;
    }

    /// Encode an RGBA still; alpha is dropped for every format
    pub fn encode(&self, image: RgbaImage) -> Result<EncodedImage, CaptureError> {
        info!(
            width = image.width(),
            height = image.height(),
            format = %self.format,
            "Starting encoding"
        );

        let (width, height) = image.dimensions();
        let rgb = DynamicImage::ImageRgba8(image).into_rgb8();
        let data = match self.format {
            CaptureFormat::Jpeg => Self::encode_jpeg(&rgb, self.jpeg_quality)?,
            CaptureFormat::Png => Self::encode_with(&rgb, ImageFormat::Png)?,
            CaptureFormat::Tiff => Self::encode_with(&rgb, ImageFormat::Tiff)?,
            CaptureFormat::Raw => Self::encode_dng(&rgb, &self.camera_metadata)?,
        };

        debug!(size = data.len(), "Encoding complete");
        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }

    fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
        let mut buffer = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(buffer)
    }

    fn encode_with(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, CaptureError> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), format)?;
        Ok(buffer)
    }

    /// Encode image as DNG (Digital Negative raw format)
    ///
    /// Writes a linear DNG with 8-bit RGB strips. libcamerasrc hands out
    /// ISP-processed frames, so this is the sensor image before any file
    /// compression rather than Bayer data.
    fn encode_dng(image: &RgbImage, metadata: &CameraMetadata) -> Result<Vec<u8>, CaptureError> {
        use dng::ifd::{Ifd, IfdValue, Offsets};
        use dng::tags::ifd as tiff_tags;
        use dng::{DngWriter, FileType};
        use std::io::Write;
        use std::sync::Arc;

        let raw_data = image.as_raw().clone();
        let raw_data_len = raw_data.len() as u32;

        let mut ifd = Ifd::default();
        ifd.insert(tiff_tags::ImageWidth, IfdValue::Long(image.width()));
        ifd.insert(tiff_tags::ImageLength, IfdValue::Long(image.height()));
        ifd.insert(
            tiff_tags::BitsPerSample,
            IfdValue::List(vec![
                IfdValue::Short(8),
                IfdValue::Short(8),
                IfdValue::Short(8),
            ]),
        );
        ifd.insert(tiff_tags::Compression, IfdValue::Short(1)); // No compression
        ifd.insert(tiff_tags::PhotometricInterpretation, IfdValue::Short(2)); // RGB
        ifd.insert(tiff_tags::SamplesPerPixel, IfdValue::Short(3));
        ifd.insert(tiff_tags::RowsPerStrip, IfdValue::Long(image.height()));
        ifd.insert(tiff_tags::PlanarConfiguration, IfdValue::Short(1)); // Chunky

        let software = match metadata.lens_position {
            Some(position) => format!(
                "picam v{} (lens {:.2} dpt)",
                env!("CARGO_PKG_VERSION"),
                position
            ),
            None => format!("picam v{}", env!("CARGO_PKG_VERSION")),
        };
        ifd.insert(tiff_tags::Software, IfdValue::Ascii(software));

        if let Some(camera_name) = &metadata.camera_name {
            ifd.insert(tiff_tags::Make, IfdValue::Ascii("Raspberry Pi".to_string()));
            ifd.insert(tiff_tags::Model, IfdValue::Ascii(camera_name.clone()));
        }

        struct RgbOffsets {
            data: Vec<u8>,
        }

        impl Offsets for RgbOffsets {
            fn size(&self) -> u32 {
                self.data.len() as u32
            }

            fn write(&self, writer: &mut dyn Write) -> std::io::Result<()> {
                writer.write_all(&self.data)
            }
        }

        let offsets: Arc<dyn Offsets + Send + Sync> = Arc::new(RgbOffsets { data: raw_data });
        ifd.insert(tiff_tags::StripOffsets, IfdValue::Offsets(offsets));
        ifd.insert(tiff_tags::StripByteCounts, IfdValue::Long(raw_data_len));

        let mut buffer = Vec::new();
        DngWriter::write_dng(Cursor::new(&mut buffer), true, FileType::Dng, vec![ifd])
            .map_err(|e| CaptureError::EncodingFailed(format!("DNG encoding failed: {:?}", e)))?;
        Ok(buffer)
    }
}
