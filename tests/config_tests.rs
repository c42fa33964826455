// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use picam::Config;
use picam::model::{ApplicationState, CaptureFormat, FocusMode, Resolution, Theme};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.theme, Theme::Dark, "Dark theme should be the default");
    assert_eq!(config.preview_resolution, Resolution::new(1280, 720));
    assert_eq!(config.capture_format, CaptureFormat::Jpeg);
    assert_eq!(config.focus_mode, FocusMode::Continuous);
    assert!(config.camera_name.is_none());
}

#[test]
fn test_state_seeded_from_config() {
    let config = Config {
        theme: Theme::Light,
        preview_width: 640,
        preview_height: 480,
        capture_format: CaptureFormat::Png,
        lens_position: 42.0,
        ..Config::default()
    };
    let state = ApplicationState::from_config(&config);

    assert_eq!(state.theme, Theme::Light);
    assert_eq!(state.capture_format, CaptureFormat::Png);
    assert_eq!(state.preview_size.width, 640.0);
    assert_eq!(state.manual_focus_position, 10.0, "Lens position is clamped");
    assert_eq!(state.crop_rect, None);
    assert!(!state.is_recording);
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let config = Config {
        jpeg_quality: 0,
        magnifier_zoom: 0.25,
        ..Config::default()
    };
    assert_eq!(config.jpeg_quality(), 1);
    assert_eq!(config.magnifier_zoom(), 1.0);
}
