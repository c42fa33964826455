// SPDX-License-Identifier: GPL-3.0-only

//! Camera session abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   Control panel     │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraSession trait │  ← configure / capture / record / focus
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  LibcameraSession   │  ← GStreamer pipelines on libcamerasrc
//! └─────────────────────┘
//! ```

pub mod libcamera;
pub mod types;

pub use libcamera::LibcameraSession;
pub use types::*;

use crate::errors::{CameraError, CaptureError, FocusError, RecordingError};
use crate::model::{CaptureRequest, FocusMode, Resolution};
use std::path::PathBuf;
use std::sync::Arc;

/// The camera as seen by the application
///
/// Implementations own the device and serialize access to it internally,
/// so every method takes `&self` and may be called from any thread.
/// Blocking methods (configure, capture, recording) are run off the UI
/// thread by the caller. Focus methods must return without waiting on a
/// running capture or recording stop.
pub trait CameraSession: Send + Sync {
    /// Restart the preview stream at `resolution`
    fn configure(&self, resolution: Resolution) -> Result<(), CameraError>;

    /// Newest preview frame, if any arrived yet
    fn latest_frame(&self) -> Option<Arc<CameraFrame>>;

    /// Take a still and write it to disk, returning the written path
    fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, CaptureError>;

    /// Begin writing a new MP4 file, returning its path
    fn start_recording(&self) -> Result<PathBuf, RecordingError>;

    /// Finalize the current MP4 file, returning its path
    fn stop_recording(&self) -> Result<PathBuf, RecordingError>;

    fn set_focus_mode(&self, mode: FocusMode) -> Result<(), FocusError>;

    /// Run one autofocus scan (auto-one-shot mode)
    fn trigger_autofocus(&self) -> Result<(), FocusError>;

    /// Move the lens to `position` dioptres (manual mode)
    fn set_lens_position(&self, position: f32) -> Result<(), FocusError>;

    /// Lens position last reported or requested, if known
    fn lens_position(&self) -> Option<f32>;

    /// Stop every pipeline, finalizing an open recording first
    ///
    /// Returns the path of the recording that was finalized, if any.
    fn close(&self) -> Result<Option<PathBuf>, RecordingError>;
}
