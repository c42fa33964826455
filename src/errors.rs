// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera application
//!
//! Every failure reported by the camera session lands in one of the
//! sub-enums below. The control panel converts them into transient
//! notifications; only [`CameraError::OpenFailed`] and
//! [`CameraError::NotAvailable`] at startup abort the application.

use crate::model::Resolution;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera session and device configuration errors
    Camera(CameraError),
    /// Still capture errors
    Capture(CaptureError),
    /// Recording-related errors
    Recording(RecordingError),
    /// Focus command errors
    Focus(FocusError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Camera session errors
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// libcamerasrc (or GStreamer itself) is missing
    NotAvailable(String),
    /// The camera session could not be opened
    OpenFailed(String),
    /// The sensor rejected the requested output size
    UnsupportedResolution {
        resolution: Resolution,
        reason: String,
    },
    /// The sensor is held by another pipeline (e.g. during recording)
    Busy,
    /// A GStreamer pipeline failed while running
    PipelineFailed(String),
}

/// Still capture errors
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// The still pipeline produced no frame before the timeout
    NoFrameAvailable,
    /// The still pipeline failed
    StillFailed(String),
    /// Crop rectangle does not intersect the captured frame
    EmptyCrop,
    /// Encoding failed
    EncodingFailed(String),
    /// Writing the file failed
    SaveFailed(String),
}

/// Recording-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to stop recording or finalize the file
    StopFailed(String),
    /// No usable H.264 encoder is installed
    EncoderNotAvailable(String),
    /// Recording already in progress
    AlreadyRecording,
    /// No recording to stop
    NotRecording,
}

/// Focus command errors
#[derive(Debug, Clone, PartialEq)]
pub enum FocusError {
    /// The camera source does not expose the named control
    Unsupported(String),
    /// The control exists but the value was rejected
    CommandFailed(String),
    /// No running pipeline to send the command to
    NoActivePipeline,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Focus(e) => write!(f, "Focus error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NotAvailable(msg) => write!(f, "Camera stack not available: {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::UnsupportedResolution { resolution, reason } => {
                write!(f, "Resolution {} not supported: {}", resolution, reason)
            }
            CameraError::Busy => write!(f, "Camera is busy"),
            CameraError::PipelineFailed(msg) => write!(f, "Pipeline failed: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CaptureError::StillFailed(msg) => write!(f, "Still capture failed: {}", msg),
            CaptureError::EmptyCrop => write!(f, "Crop area is empty"),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            RecordingError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            RecordingError::EncoderNotAvailable(msg) => write!(f, "Encoder not available: {}", msg),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::NotRecording => write!(f, "No recording in progress"),
        }
    }
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusError::Unsupported(control) => {
                write!(f, "Camera does not support the {} control", control)
            }
            FocusError::CommandFailed(msg) => write!(f, "Focus command failed: {}", msg),
            FocusError::NoActivePipeline => write!(f, "Camera is not streaming"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for RecordingError {}
impl std::error::Error for FocusError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<FocusError> for AppError {
    fn from(err: FocusError) -> Self {
        AppError::Focus(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::EncodingFailed(err.to_string())
    }
}
