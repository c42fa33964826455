// SPDX-License-Identifier: GPL-3.0-only

//! Application state and the closed value types it is made of
//!
//! There is exactly one [`ApplicationState`] per running application. It is
//! a field of the GUI model and is handed by reference to the control and
//! overlay handlers; nothing here is global.

use crate::config::Config;
use crate::constants::focus;
use crate::geometry::{Rectangle, Rotation, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor output size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Colour scheme of the window and the preview overlays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Get the COSMIC theme for this scheme
    pub fn cosmic_theme(self) -> cosmic::Theme {
        match self {
            Theme::Dark => {
                let mut theme = cosmic::theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Theme::Light => {
                let mut theme = cosmic::theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
        }
    }
}

/// Autofocus behaviour requested from the sensor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusMode {
    /// Focus once when triggered, then hold
    AutoOneShot,
    /// Keep refocusing while streaming
    #[default]
    Continuous,
    /// Lens position is set explicitly
    Manual,
}

impl FocusMode {
    pub const ALL: [FocusMode; 3] = [
        FocusMode::AutoOneShot,
        FocusMode::Continuous,
        FocusMode::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusMode::AutoOneShot => "auto",
            FocusMode::Continuous => "continuous",
            FocusMode::Manual => "manual",
        }
    }
}

impl TryFrom<&str> for FocusMode {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "auto-one-shot" | "oneshot" => Ok(FocusMode::AutoOneShot),
            "continuous" => Ok(FocusMode::Continuous),
            "manual" => Ok(FocusMode::Manual),
            other => Err(format!("unknown focus mode '{}'", other)),
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Still image file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFormat {
    #[default]
    Jpeg,
    Png,
    Tiff,
    /// Unprocessed sensor RGB stored as DNG
    Raw,
}

impl CaptureFormat {
    pub const ALL: [CaptureFormat; 4] = [
        CaptureFormat::Jpeg,
        CaptureFormat::Png,
        CaptureFormat::Tiff,
        CaptureFormat::Raw,
    ];

    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Jpeg => "jpg",
            CaptureFormat::Png => "png",
            CaptureFormat::Tiff => "tiff",
            CaptureFormat::Raw => "dng",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureFormat::Jpeg => "jpeg",
            CaptureFormat::Png => "png",
            CaptureFormat::Tiff => "tiff",
            CaptureFormat::Raw => "raw",
        }
    }
}

impl TryFrom<&str> for CaptureFormat {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(CaptureFormat::Jpeg),
            "png" => Ok(CaptureFormat::Png),
            "tiff" | "tif" => Ok(CaptureFormat::Tiff),
            "raw" | "dng" => Ok(CaptureFormat::Raw),
            other => Err(format!("unknown capture format '{}'", other)),
        }
    }
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Focus distance in millimetres for a lens position in dioptres
///
/// Returns `None` for position 0, which is focus at infinity.
pub fn focus_distance_mm(position: f32) -> Option<f32> {
    if position <= 0.0 {
        None
    } else {
        Some(1000.0 / position)
    }
}

/// The single mutable record of the running application
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationState {
    /// Preview stream size
    pub resolution: Resolution,
    /// Size of still captures
    pub capture_resolution: Resolution,
    /// Format of the next still capture
    pub capture_format: CaptureFormat,
    /// Crop in preview coordinates, applied to stills
    pub crop_rect: Option<Rectangle>,
    pub rotation: Rotation,
    pub is_recording: bool,
    pub theme: Theme,
    pub focus_mode: FocusMode,
    /// Lens position in dioptres, used in manual mode
    pub manual_focus_position: f32,
    pub magnifier_enabled: bool,
    pub preview_paused: bool,
    /// Size of the preview surface in logical pixels
    pub preview_size: Size,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            resolution: Resolution::new(1280, 720),
            capture_resolution: Resolution::new(4608, 3456),
            capture_format: CaptureFormat::Jpeg,
            crop_rect: None,
            rotation: Rotation::Deg0,
            is_recording: false,
            theme: Theme::Dark,
            focus_mode: FocusMode::Continuous,
            manual_focus_position: focus::LENS_POSITION_DEFAULT,
            magnifier_enabled: false,
            preview_paused: false,
            preview_size: Size::new(800.0, 600.0),
        }
    }
}

impl ApplicationState {
    /// Initial state seeded from the persisted start-up defaults
    pub fn from_config(config: &Config) -> Self {
        Self {
            resolution: config.preview_resolution,
            capture_resolution: config.capture_resolution,
            capture_format: config.capture_format,
            theme: config.theme,
            focus_mode: config.focus_mode,
            manual_focus_position: config
                .lens_position
                .clamp(0.0, focus::LENS_POSITION_MAX),
            magnifier_enabled: config.magnifier_enabled,
            preview_size: Size::new(
                config.preview_width.max(1) as f32,
                config.preview_height.max(1) as f32,
            ),
            ..Self::default()
        }
    }

    /// Snapshot of what a capture needs right now
    pub fn capture_request(&self) -> CaptureRequest {
        CaptureRequest {
            format: self.capture_format,
            crop_rect: self.crop_rect,
            resolution: self.capture_resolution,
            preview_size: self.preview_size,
            rotation: self.rotation,
        }
    }
}

/// Transient description of one still capture
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureRequest {
    pub format: CaptureFormat,
    /// Crop in preview coordinates
    pub crop_rect: Option<Rectangle>,
    pub resolution: Resolution,
    /// Surface the crop was drawn on
    pub preview_size: Size,
    /// Rotation the crop was drawn under
    pub rotation: Rotation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_double_toggle() {
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn test_capture_format_parsing() {
        assert_eq!(CaptureFormat::try_from("JPG"), Ok(CaptureFormat::Jpeg));
        assert_eq!(CaptureFormat::try_from("raw"), Ok(CaptureFormat::Raw));
        assert!(CaptureFormat::try_from("gif").is_err());
        assert_eq!(CaptureFormat::Raw.extension(), "dng");
    }

    #[test]
    fn test_focus_mode_parsing() {
        assert_eq!(FocusMode::try_from("auto"), Ok(FocusMode::AutoOneShot));
        assert_eq!(FocusMode::try_from(" Manual "), Ok(FocusMode::Manual));
        assert!(FocusMode::try_from("macro").is_err());
    }

    #[test]
    fn test_focus_distance() {
        assert_eq!(focus_distance_mm(0.0), None);
        assert_eq!(focus_distance_mm(5.0), Some(200.0));
    }

    #[test]
    fn test_default_state() {
        let state = ApplicationState::default();
        assert_eq!(state.resolution, Resolution::new(1280, 720));
        assert_eq!(state.rotation, Rotation::Deg0);
        assert!(state.crop_rect.is_none());
        assert!(!state.is_recording);
        assert_eq!(state.focus_mode, FocusMode::Continuous);
    }

    #[test]
    fn test_state_from_config() {
        let config = Config {
            theme: Theme::Light,
            preview_resolution: Resolution::new(640, 480),
            lens_position: 42.0,
            ..Config::default()
        };
        let state = ApplicationState::from_config(&config);
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(state.resolution, Resolution::new(640, 480));
        assert_eq!(state.manual_focus_position, focus::LENS_POSITION_MAX);
    }
}
