// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{BitratePreset, focus, magnifier, preview};
use crate::model::{CaptureFormat, FocusMode, Resolution, Theme};
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};

/// Start-up defaults; read once when the window opens and never written back
#[derive(Debug, Clone, CosmicConfigEntry, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Initial colour scheme
    pub theme: Theme,
    /// Preview surface width in logical pixels
    pub preview_width: u32,
    /// Preview surface height in logical pixels
    pub preview_height: u32,
    /// Initial preview stream size
    pub preview_resolution: Resolution,
    /// Initial still capture size
    pub capture_resolution: Resolution,
    /// Initial still capture format
    pub capture_format: CaptureFormat,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Initial autofocus mode
    pub focus_mode: FocusMode,
    /// Initial manual lens position in dioptres
    pub lens_position: f32,
    /// Show the magnifier at start-up
    pub magnifier_enabled: bool,
    /// Magnifier zoom factor
    pub magnifier_zoom: f32,
    /// Video encoder bitrate preset (Low, Medium, High)
    pub bitrate_preset: BitratePreset,
    /// Where stills are written (default: XDG pictures/picam)
    pub photo_directory: Option<String>,
    /// Where recordings are written (default: XDG videos/picam)
    pub video_directory: Option<String>,
    /// libcamera camera name passed to libcamerasrc
    pub camera_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            preview_width: preview::DEFAULT_WIDTH,
            preview_height: preview::DEFAULT_HEIGHT,
            preview_resolution: Resolution::new(1280, 720),
            capture_resolution: Resolution::new(4608, 3456),
            capture_format: CaptureFormat::Jpeg,
            jpeg_quality: 92,
            focus_mode: FocusMode::Continuous,
            lens_position: focus::LENS_POSITION_DEFAULT,
            magnifier_enabled: false,
            magnifier_zoom: magnifier::DEFAULT_ZOOM,
            bitrate_preset: BitratePreset::default(),
            photo_directory: None,
            video_directory: None,
            camera_name: None,
        }
    }
}

impl Config {
    /// Load the entry for `app_id`, falling back to defaults on any error
    pub fn load(app_id: &str) -> Self {
        match cosmic_config::Config::new(app_id, Self::VERSION) {
            Ok(handler) => match Self::get_entry(&handler) {
                Ok(config) => config,
                Err((errors, config)) => {
                    tracing::error!(?errors, "Errors loading config");
                    config
                }
            },
            Err(err) => {
                tracing::error!(%err, "Failed to create config handler");
                Self::default()
            }
        }
    }

    /// JPEG quality clamped to the range the encoder accepts
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }

    /// Magnifier zoom, never below 1x
    pub fn magnifier_zoom(&self) -> f32 {
        if self.magnifier_zoom.is_finite() {
            self.magnifier_zoom.max(1.0)
        } else {
            magnifier::DEFAULT_ZOOM
        }
    }
}
