// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use picam::constants::{BitratePreset, CAPTURE_RESOLUTIONS, PREVIEW_RESOLUTIONS};
use picam::model::Resolution;

#[test]
fn test_bitrate_preset_values() {
    assert_eq!(BitratePreset::ALL.len(), 3);
}

#[test]
fn test_bitrate_preset_ordering() {
    // Presets are ordered from lowest to highest quality
    let mut prev_bitrate = 0u32;
    for preset in BitratePreset::ALL {
        let bitrate = preset.bitrate_kbps(Resolution::new(1920, 1080));
        assert!(
            bitrate >= prev_bitrate,
            "Presets should be ordered from lowest to highest"
        );
        prev_bitrate = bitrate;
    }
}

#[test]
fn test_bitrate_scales_with_resolution() {
    let sd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(640, 480));
    let hd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(1280, 720));
    let fhd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(1920, 1080));

    assert!(sd_bitrate < hd_bitrate);
    assert!(hd_bitrate < fhd_bitrate);
}

#[test]
fn test_resolution_choices() {
    assert_eq!(
        PREVIEW_RESOLUTIONS,
        [
            Resolution::new(640, 480),
            Resolution::new(1280, 720),
            Resolution::new(1920, 1080),
        ]
    );
    assert!(CAPTURE_RESOLUTIONS.contains(&Resolution::new(4608, 3456)));
}
