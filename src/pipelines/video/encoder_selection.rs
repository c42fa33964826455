// SPDX-License-Identifier: GPL-3.0-only

//! H.264 encoder selection for the recording pipeline
//!
//! The Pi's hardware encoder (`v4l2h264enc`) is preferred; software
//! encoders are used when it is missing or cannot be created.

use crate::constants::BitratePreset;
use crate::errors::RecordingError;
use crate::model::Resolution;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Candidate encoders in order of preference
pub const H264_ENCODERS: [&str; 3] = ["v4l2h264enc", "x264enc", "openh264enc"];

/// OpenH264 rejects frames above this many pixels
const OPENH264_MAX_PIXELS: u64 = 9_437_184;

/// Configuration for encoder selection
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    pub resolution: Resolution,
    pub bitrate_preset: BitratePreset,
}

impl EncoderConfig {
    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_preset.bitrate_kbps(self.resolution)
    }
}

/// Encoder chosen for a recording
pub struct SelectedEncoder {
    pub name: &'static str,
    pub encoder: gst::Element,
    /// Stream parser placed between encoder and muxer
    pub parser: gst::Element,
}

/// Pick the first encoder from [`H264_ENCODERS`] that can be created
pub fn select_h264_encoder(config: &EncoderConfig) -> Result<SelectedEncoder, RecordingError> {
    let available: Vec<&'static str> = H264_ENCODERS
        .iter()
        .copied()
        .filter(|name| gst::ElementFactory::find(name).is_some())
        .filter(|name| *name != "openh264enc" || config.resolution.pixels() <= OPENH264_MAX_PIXELS)
        .collect();
    debug!(?available, "Available H.264 encoders");

    for name in available {
        match gst::ElementFactory::make(name).build() {
            Ok(encoder) => {
                configure_encoder(name, &encoder, config.bitrate_kbps());
                let parser = gst::ElementFactory::make("h264parse")
                    .build()
                    .map_err(|e| {
                        RecordingError::EncoderNotAvailable(format!("h264parse: {}", e))
                    })?;
                info!(encoder = name, bitrate_kbps = config.bitrate_kbps(), "Selected H.264 encoder");
                return Ok(SelectedEncoder {
                    name,
                    encoder,
                    parser,
                });
            }
            Err(e) => warn!(encoder = name, error = %e, "Failed to create encoder"),
        }
    }

    Err(RecordingError::EncoderNotAvailable(format!(
        "none of {} is installed",
        H264_ENCODERS.join(", ")
    )))
}

/// Apply bitrate and latency settings in each encoder's own units
fn configure_encoder(name: &str, encoder: &gst::Element, bitrate_kbps: u32) {
    match name {
        "x264enc" => {
            encoder.set_property("bitrate", bitrate_kbps);
            encoder.set_property_from_str("tune", "zerolatency");
            encoder.set_property_from_str("speed-preset", "ultrafast");
        }
        "openh264enc" => {
            encoder.set_property("bitrate", bitrate_kbps * 1000);
        }
        "v4l2h264enc" => {
            let controls = gst::Structure::builder("controls")
                .field("video_bitrate", (bitrate_kbps * 1000) as i32)
                .build();
            encoder.set_property("extra-controls", controls);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_encoder_first() {
        assert_eq!(H264_ENCODERS[0], "v4l2h264enc");
    }

    #[test]
    fn test_bitrate_follows_preset() {
        let config = EncoderConfig {
            resolution: Resolution::new(1280, 720),
            bitrate_preset: BitratePreset::Medium,
        };
        assert_eq!(config.bitrate_kbps(), 5_000);
    }
}
