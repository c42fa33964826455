// SPDX-License-Identifier: GPL-3.0-only

//! libcamera backend through GStreamer's `libcamerasrc`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  LibcameraSession   │  ← Implements CameraSession
//! └──────────┬──────────┘
//!            │ one of
//!     ┌──────┴───────┬────────────────┐
//!     ▼              ▼                ▼
//! PreviewPipeline  VideoRecorder   StillCapture (transient)
//!     └──────────────┴─────► LatestFrame ◄── UI timer
//! ```
//!
//! The sensor is exclusive, so exactly one pipeline owns it at a time. A
//! still capture tears the preview down, grabs a frame at capture
//! resolution, and brings the preview back before encoding.
//!
//! Focus writes never wait for the pipeline lock. They go through
//! [`FocusControl`], which the session points at whichever pipeline
//! currently owns the sensor.

pub mod controls;
pub mod pipeline;

pub use controls::{AfMode, FocusControl, FocusSettings};
pub use pipeline::PreviewPipeline;

use super::CameraSession;
use super::types::{CameraFrame, LatestFrame};
use crate::constants::{BitratePreset, files};
use crate::errors::{CameraError, CaptureError, FocusError, RecordingError};
use crate::model::{CaptureRequest, FocusMode, Resolution};
use crate::pipelines::photo::{CameraMetadata, PhotoPipeline, StillCapture};
use crate::pipelines::video::{EncoderConfig, VideoRecorder};
use crate::storage;
use gstreamer as gst;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

/// Fixed settings a session is opened with
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// libcamera camera name; `None` picks the first camera
    pub camera_name: Option<String>,
    pub photo_dir: PathBuf,
    pub video_dir: PathBuf,
    pub jpeg_quality: u8,
    pub bitrate_preset: BitratePreset,
}

/// Pipeline currently holding the sensor
enum ActivePipeline {
    Preview(PreviewPipeline),
    Recording(VideoRecorder),
    Stopped,
}

impl ActivePipeline {
    fn camera_source(&self) -> Option<gst::Element> {
        match self {
            ActivePipeline::Preview(preview) => preview.camera_source(),
            ActivePipeline::Recording(recorder) => recorder.camera_source(),
            ActivePipeline::Stopped => None,
        }
    }
}

struct Inner {
    resolution: Resolution,
    active: ActivePipeline,
}

/// Camera session backed by libcamerasrc pipelines
pub struct LibcameraSession {
    settings: SessionSettings,
    frames: LatestFrame,
    focus: FocusControl,
    inner: Mutex<Inner>,
}

impl LibcameraSession {
    /// Initialize GStreamer and start the preview
    ///
    /// Fails when libcamerasrc is not installed or the camera cannot be
    /// opened at `resolution`.
    pub fn open(
        settings: SessionSettings,
        resolution: Resolution,
        focus: FocusSettings,
    ) -> Result<Self, CameraError> {
        gst::init().map_err(|e| {
            CameraError::NotAvailable(format!("Failed to initialize GStreamer: {}", e))
        })?;
        if gst::ElementFactory::find("libcamerasrc").is_none() {
            return Err(CameraError::NotAvailable(
                "GStreamer element libcamerasrc is not installed".to_string(),
            ));
        }

        let frames = LatestFrame::new();
        let preview = PreviewPipeline::start(
            settings.camera_name.as_deref(),
            resolution,
            frames.clone(),
            &focus,
        )
        .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        info!(camera = ?settings.camera_name, %resolution, "Camera session opened");
        let focus = FocusControl::new(focus);
        focus.attach(preview.camera_source());
        Ok(Self {
            settings,
            frames,
            focus,
            inner: Mutex::new(Inner {
                resolution,
                active: ActivePipeline::Preview(preview),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn camera_name(&self) -> Option<&str> {
        self.settings.camera_name.as_deref()
    }

    fn start_preview(&self, inner: &Inner) -> Result<PreviewPipeline, CameraError> {
        PreviewPipeline::start(
            self.camera_name(),
            inner.resolution,
            self.frames.clone(),
            &self.focus.settings(),
        )
    }

    /// Hand the sensor to `active` and point focus writes at its source
    fn activate(&self, inner: &mut Inner, active: ActivePipeline) {
        self.focus.attach(active.camera_source());
        inner.active = active;
    }

    /// Tear down whatever holds the sensor
    fn release(&self, inner: &mut Inner) -> ActivePipeline {
        self.focus.attach(None);
        std::mem::replace(&mut inner.active, ActivePipeline::Stopped)
    }

    /// Restart the preview after the sensor was borrowed, logging failures
    fn restore_preview(&self, inner: &mut Inner) {
        match self.start_preview(inner) {
            Ok(preview) => self.activate(inner, ActivePipeline::Preview(preview)),
            Err(e) => {
                error!(error = %e, "Failed to restart preview");
                self.release(inner);
            }
        }
    }
}

impl Drop for LibcameraSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "Failed to finalize recording on drop");
        }
    }
}

impl CameraSession for LibcameraSession {
    fn configure(&self, resolution: Resolution) -> Result<(), CameraError> {
        let mut inner = self.lock();
        if matches!(inner.active, ActivePipeline::Recording(_)) {
            return Err(CameraError::Busy);
        }

        let previous = inner.resolution;
        info!(from = %previous, to = %resolution, "Reconfiguring preview");

        // Release the sensor before asking for the new size
        self.release(&mut inner);
        self.frames.clear();
        inner.resolution = resolution;

        match self.start_preview(&inner) {
            Ok(preview) => {
                self.activate(&mut inner, ActivePipeline::Preview(preview));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, %previous, "Resolution rejected, restoring previous");
                inner.resolution = previous;
                self.restore_preview(&mut inner);
                Err(e)
            }
        }
    }

    fn latest_frame(&self) -> Option<Arc<CameraFrame>> {
        self.frames.latest()
    }

    fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, CaptureError> {
        let (image, metadata) = {
            let mut inner = self.lock();
            if matches!(inner.active, ActivePipeline::Recording(_)) {
                return Err(CaptureError::StillFailed(
                    "Camera is busy recording".to_string(),
                ));
            }

            self.release(&mut inner);
            let focus = self.focus.settings();
            let still = StillCapture::capture(self.camera_name(), request.resolution, &focus);
            self.restore_preview(&mut inner);

            let metadata = CameraMetadata {
                camera_name: self.settings.camera_name.clone(),
                lens_position: focus.lens_position,
            };
            (still?, metadata)
        };

        let pipeline = PhotoPipeline::new(request, self.settings.jpeg_quality, metadata);
        pipeline.process_and_save(image, request, &self.settings.photo_dir)
    }

    fn start_recording(&self) -> Result<PathBuf, RecordingError> {
        let mut inner = self.lock();
        if matches!(inner.active, ActivePipeline::Recording(_)) {
            return Err(RecordingError::AlreadyRecording);
        }

        let dir = storage::ensure_directory(&self.settings.video_dir).map_err(|e| {
            RecordingError::StartFailed(format!("Failed to create video directory: {}", e))
        })?;
        let path = storage::timestamped_path(
            &dir,
            files::VIDEO_PREFIX,
            files::VIDEO_EXTENSION,
            chrono::Local::now(),
        );
        let config = EncoderConfig {
            resolution: inner.resolution,
            bitrate_preset: self.settings.bitrate_preset,
        };

        self.release(&mut inner);
        let started = VideoRecorder::new(
            self.camera_name(),
            inner.resolution,
            path.clone(),
            config,
            self.frames.clone(),
            &self.focus.settings(),
        )
        .and_then(|recorder| recorder.start().map(|_| recorder));

        match started {
            Ok(recorder) => {
                self.activate(&mut inner, ActivePipeline::Recording(recorder));
                info!(path = %path.display(), "Recording started");
                Ok(path)
            }
            Err(e) => {
                self.restore_preview(&mut inner);
                Err(e)
            }
        }
    }

    fn stop_recording(&self) -> Result<PathBuf, RecordingError> {
        let mut inner = self.lock();
        if !matches!(inner.active, ActivePipeline::Recording(_)) {
            return Err(RecordingError::NotRecording);
        }
        let ActivePipeline::Recording(recorder) = self.release(&mut inner) else {
            return Err(RecordingError::NotRecording);
        };

        let result = recorder.stop();
        self.restore_preview(&mut inner);
        result
    }

    fn set_focus_mode(&self, mode: FocusMode) -> Result<(), FocusError> {
        self.focus.set_mode(mode)
    }

    fn trigger_autofocus(&self) -> Result<(), FocusError> {
        self.focus.trigger_autofocus()
    }

    fn set_lens_position(&self, position: f32) -> Result<(), FocusError> {
        self.focus.set_lens_position(position)
    }

    fn lens_position(&self) -> Option<f32> {
        self.focus.lens_position()
    }

    fn close(&self) -> Result<Option<PathBuf>, RecordingError> {
        let mut inner = self.lock();
        match self.release(&mut inner) {
            ActivePipeline::Recording(recorder) => {
                info!("Finalizing recording before closing the camera");
                recorder.stop().map(Some)
            }
            _ => Ok(None),
        }
    }
}
