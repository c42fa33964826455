// SPDX-License-Identifier: GPL-3.0-only

//! Still photo pipeline
//!
//! ```text
//! StillCapture → apply_crop → PhotoEncoder → IMG_<timestamp>.<ext>
//! ```
//!
//! Runs on a blocking worker; the camera session restarts the preview as
//! soon as the still frame has been pulled, so only crop, encode and the
//! file write happen while the preview is live again.

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::StillCapture;
pub use encoding::{CameraMetadata, EncodedImage, PhotoEncoder};
pub use processing::apply_crop;

use crate::constants::files;
use crate::errors::CaptureError;
use crate::model::CaptureRequest;
use crate::storage;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::info;

/// Crop, encode and write a captured still
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    pub fn new(request: &CaptureRequest, jpeg_quality: u8, metadata: CameraMetadata) -> Self {
        let mut encoder = PhotoEncoder::new(request.format, jpeg_quality);
        encoder.set_camera_metadata(metadata);
        Self { encoder }
    }

    /// Process a still and save it into `output_dir`
    pub fn process_and_save(
        &self,
        image: RgbaImage,
        request: &CaptureRequest,
        output_dir: &Path,
    ) -> Result<PathBuf, CaptureError> {
        let cropped = apply_crop(image, request)?;
        let encoded = self.encoder.encode(cropped)?;
        Self::save(encoded, output_dir)
    }

    /// Write encoded data to a fresh timestamped file
    pub fn save(encoded: EncodedImage, output_dir: &Path) -> Result<PathBuf, CaptureError> {
        let dir = storage::ensure_directory(output_dir)?;
        let path = storage::timestamped_path(
            &dir,
            files::PHOTO_PREFIX,
            encoded.format.extension(),
            chrono::Local::now(),
        );
        std::fs::write(&path, &encoded.data)?;
        info!(
            path = %path.display(),
            width = encoded.width,
            height = encoded.height,
            "Photo saved"
        );
        Ok(path)
    }
}
