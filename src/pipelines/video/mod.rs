// SPDX-License-Identifier: GPL-3.0-only

//! H.264/MP4 video recording
//!
//! - Hardware encoder preferred, software fallback
//! - Preview keeps running during recording through a tee
//! - Bitrate presets scaled by stream resolution

pub mod encoder_selection;
pub mod muxer;
pub mod recorder;

pub use encoder_selection::{EncoderConfig, H264_ENCODERS, select_h264_encoder};
pub use recorder::VideoRecorder;
