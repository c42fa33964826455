// SPDX-License-Identifier: GPL-3.0-only

//! One-shot still capture at full sensor resolution
//!
//! The preview stream runs at a small size, so stills are taken by a
//! dedicated short-lived pipeline at the capture resolution. The sensor is
//! exclusive: the caller must have released the preview first.

use crate::backends::camera::libcamera::controls::{FocusSettings, apply_focus};
use crate::backends::camera::libcamera::pipeline::{
    CAMERA_ELEMENT, appsink, frame_from_sample, launch, rgba_stream_description, start_playing,
    stop_pipeline,
};
use crate::constants::{pipeline, timing};
use crate::errors::CaptureError;
use crate::model::Resolution;
use gstreamer as gst;
use gstreamer::prelude::*;
use image::RgbaImage;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Still capture handler
pub struct StillCapture;

impl StillCapture {
    /// Grab one frame at `resolution`
    ///
    /// The first few frames are discarded so exposure and focus settle.
    pub fn capture(
        camera_name: Option<&str>,
        resolution: Resolution,
        focus: &FocusSettings,
    ) -> Result<RgbaImage, CaptureError> {
        info!(%resolution, "Capturing still");

        let pipeline = launch(&rgba_stream_description(camera_name, resolution))
            .map_err(CaptureError::StillFailed)?;
        let sink = appsink(&pipeline).map_err(CaptureError::StillFailed)?;
        sink.set_property("sync", false);
        sink.set_property("max-buffers", 1u32);
        sink.set_property("drop", true);

        if let Some(source) = pipeline.by_name(CAMERA_ELEMENT)
            && let Err(e) = apply_focus(&source, focus)
        {
            warn!(error = %e, "Focus settings not applied to still capture");
        }

        start_playing(&pipeline).map_err(CaptureError::StillFailed)?;
        let result = Self::pull_settled_frame(&sink);
        stop_pipeline(&pipeline);
        result
    }

    fn pull_settled_frame(sink: &gstreamer_app::AppSink) -> Result<RgbaImage, CaptureError> {
        let deadline = Instant::now() + Duration::from_secs(timing::STILL_TIMEOUT_SECS);
        let mut seen = 0u32;

        while Instant::now() < deadline {
            let Some(sample) = sink.try_pull_sample(gst::ClockTime::from_mseconds(500)) else {
                if sink.is_eos() {
                    break;
                }
                continue;
            };
            seen += 1;
            if seen <= pipeline::STILL_WARMUP_FRAMES {
                debug!(frame = seen, "Discarding warmup frame");
                continue;
            }

            let frame = frame_from_sample(&sample).map_err(CaptureError::StillFailed)?;
            return frame.to_rgba_image().ok_or_else(|| {
                CaptureError::StillFailed("Still frame has inconsistent geometry".to_string())
            });
        }

        warn!(frames = seen, "Still capture timed out");
        Err(CaptureError::NoFrameAvailable)
    }
}
