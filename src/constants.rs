// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use crate::model::Resolution;
use serde::{Deserialize, Serialize};

/// Preview stream sizes offered by the resolution selector
pub const PREVIEW_RESOLUTIONS: [Resolution; 3] = [
    Resolution::new(640, 480),
    Resolution::new(1280, 720),
    Resolution::new(1920, 1080),
];

/// Still capture sizes offered by the capture resolution selector
pub const CAPTURE_RESOLUTIONS: [Resolution; 3] = [
    Resolution::new(1920, 1080),
    Resolution::new(4608, 2592),
    Resolution::new(4608, 3456),
];

/// Video encoder bitrate presets
///
/// These presets define the target bitrate for H.264 recording based on
/// the preview stream resolution the recording is made at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Low bitrate - smaller files, reduced quality
    Low,
    /// Medium bitrate - balanced quality and file size (default)
    #[default]
    Medium,
    /// High bitrate - larger files, better quality
    High,
}

impl BitratePreset {
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    /// Get bitrate in kbps for a given resolution
    ///
    /// - SD (640x480): Low=1, Medium=2, High=4 Mbps
    /// - HD (1280x720): Low=2.5, Medium=5, High=10 Mbps
    /// - Full HD (1920x1080) and above: Low=4, Medium=8, High=16 Mbps
    pub fn bitrate_kbps(&self, resolution: Resolution) -> u32 {
        match (ResolutionTier::for_width(resolution.width), self) {
            (ResolutionTier::SD, BitratePreset::Low) => 1_000,
            (ResolutionTier::SD, BitratePreset::Medium) => 2_000,
            (ResolutionTier::SD, BitratePreset::High) => 4_000,
            (ResolutionTier::HD, BitratePreset::Low) => 2_500,
            (ResolutionTier::HD, BitratePreset::Medium) => 5_000,
            (ResolutionTier::HD, BitratePreset::High) => 10_000,
            (ResolutionTier::FullHD, BitratePreset::Low) => 4_000,
            (ResolutionTier::FullHD, BitratePreset::Medium) => 8_000,
            (ResolutionTier::FullHD, BitratePreset::High) => 16_000,
        }
    }
}

/// Resolution tiers for bitrate selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// 640x480 and below
    SD,
    /// 1280x720
    HD,
    /// 1920x1080 and above
    FullHD,
}

impl ResolutionTier {
    pub fn for_width(width: u32) -> Self {
        match width {
            w if w >= 1920 => ResolutionTier::FullHD,
            w if w >= 1280 => ResolutionTier::HD,
            _ => ResolutionTier::SD,
        }
    }
}

/// Preview surface constants
pub mod preview {
    /// Default preview surface width in logical pixels
    pub const DEFAULT_WIDTH: u32 = 800;

    /// Default preview surface height in logical pixels
    pub const DEFAULT_HEIGHT: u32 = 600;

    /// Crop outline thickness in pixels
    pub const OUTLINE_WIDTH: u32 = 2;

    /// Radius of the recording dot in pixels
    pub const RECORD_INDICATOR_RADIUS: u32 = 8;

    /// Distance of the recording dot's centre from the frame's top-left corner
    pub const RECORD_INDICATOR_INSET: u32 = 18;
}

/// Magnifier constants
pub mod magnifier {
    /// Side of the square magnifier window in preview pixels
    pub const WINDOW_SIZE: f32 = 200.0;

    /// Default zoom factor of the magnifier
    pub const DEFAULT_ZOOM: f32 = 2.0;

    /// Distance between the pointer and the magnifier window
    pub const POINTER_OFFSET: f32 = 20.0;

    /// Border thickness around the magnified image
    pub const BORDER_WIDTH: u32 = 2;
}

/// Focus control constants
pub mod focus {
    /// Largest lens position in dioptres (closest focus)
    pub const LENS_POSITION_MAX: f32 = 10.0;

    /// Lens position used before the sensor reports one
    pub const LENS_POSITION_DEFAULT: f32 = 5.0;

    /// Slider step in dioptres
    pub const SLIDER_STEP: f32 = 0.01;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// Frames discarded by the still pipeline while exposure settles
    pub const STILL_WARMUP_FRAMES: u32 = 3;
}

/// Timing constants
pub mod timing {
    /// Preview refresh interval (about 30 fps)
    pub const PREVIEW_TICK_MS: u64 = 33;

    /// How long a notification stays on the status line
    pub const NOTIFICATION_TIMEOUT_MS: u64 = 4000;

    /// Half period of the recording indicator blink
    pub const RECORD_BLINK_MS: u64 = 500;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Time allowed for a still frame to arrive
    pub const STILL_TIMEOUT_SECS: u64 = 5;

    /// Time allowed for the muxer to finish after end-of-stream
    pub const EOS_TIMEOUT_SECS: u64 = 5;
}

/// File naming
pub mod files {
    /// Prefix of still image files
    pub const PHOTO_PREFIX: &str = "IMG";

    /// Prefix of recorded video files
    pub const VIDEO_PREFIX: &str = "VID";

    /// Container extension of recordings
    pub const VIDEO_EXTENSION: &str = "mp4";

    /// Subdirectory created under the XDG picture and video directories
    pub const APP_DIRECTORY: &str = "picam";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_lists_sorted() {
        assert!(PREVIEW_RESOLUTIONS.windows(2).all(|w| w[0].pixels() < w[1].pixels()));
        assert!(CAPTURE_RESOLUTIONS.windows(2).all(|w| w[0].pixels() < w[1].pixels()));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ResolutionTier::for_width(640), ResolutionTier::SD);
        assert_eq!(ResolutionTier::for_width(1280), ResolutionTier::HD);
        assert_eq!(ResolutionTier::for_width(4608), ResolutionTier::FullHD);
    }
}
