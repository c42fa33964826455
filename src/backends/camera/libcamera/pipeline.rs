// SPDX-License-Identifier: GPL-3.0-only

//! libcamerasrc preview pipeline
//!
//! ```text
//! libcamerasrc ! video/x-raw,width,height ! videoconvert ! video/x-raw,format=RGBA ! appsink
//! ```
//!
//! Frames are written into a [`LatestFrame`] slot from the appsink
//! streaming thread; the UI picks them up on its own timer.

use super::controls::{FocusSettings, apply_focus};
use crate::backends::camera::types::{CameraFrame, FrameData, LatestFrame};
use crate::constants::{pipeline, timing};
use crate::errors::CameraError;
use crate::model::Resolution;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Name given to the libcamerasrc element in every pipeline
pub const CAMERA_ELEMENT: &str = "camera";

/// Name given to the RGBA appsink in every pipeline
pub const SINK_ELEMENT: &str = "sink";

/// `libcamerasrc` launch fragment, optionally pinned to a named camera
pub fn source_description(camera_name: Option<&str>) -> String {
    match camera_name {
        Some(name) if !name.is_empty() => {
            format!(
                "libcamerasrc name={} camera-name=\"{}\"",
                CAMERA_ELEMENT,
                name.replace('"', "")
            )
        }
        _ => format!("libcamerasrc name={}", CAMERA_ELEMENT),
    }
}

/// Launch description for an RGBA stream at `resolution`
pub fn rgba_stream_description(camera_name: Option<&str>, resolution: Resolution) -> String {
    format!(
        "{} ! video/x-raw,width={},height={} ! videoconvert ! video/x-raw,format={} ! appsink name={}",
        source_description(camera_name),
        resolution.width,
        resolution.height,
        pipeline::OUTPUT_FORMAT,
        SINK_ELEMENT
    )
}

/// Parse a launch description into a pipeline
pub fn launch(description: &str) -> Result<gst::Pipeline, String> {
    debug!(description, "Parsing pipeline");
    gst::parse::launch(description)
        .map_err(|e| format!("Failed to parse pipeline: {}", e))?
        .downcast::<gst::Pipeline>()
        .map_err(|_| "Launch description is not a pipeline".to_string())
}

/// Look up the RGBA appsink by name
pub fn appsink(pipeline: &gst::Pipeline) -> Result<AppSink, String> {
    pipeline
        .by_name(SINK_ELEMENT)
        .ok_or_else(|| "Failed to get appsink".to_string())?
        .dynamic_cast::<AppSink>()
        .map_err(|_| "Failed to cast appsink".to_string())
}

/// Copy a sample into a frame, keeping the buffer mapped instead of copying
pub fn frame_from_sample(sample: &gst::Sample) -> Result<CameraFrame, String> {
    let buffer = sample
        .buffer_owned()
        .ok_or_else(|| "No buffer in sample".to_string())?;
    let caps = sample.caps().ok_or_else(|| "No caps in sample".to_string())?;
    let video_info =
        VideoInfo::from_caps(caps).map_err(|e| format!("Failed to get video info: {}", e))?;
    let stride = video_info.stride()[0] as u32;
    let map = buffer
        .into_mapped_buffer_readable()
        .map_err(|_| "Failed to map buffer".to_string())?;

    Ok(CameraFrame {
        width: video_info.width(),
        height: video_info.height(),
        stride,
        data: FrameData::from_mapped_buffer(map),
        captured_at: Instant::now(),
    })
}

/// Route every appsink sample into `frames`
pub fn attach_frame_sink(appsink: &AppSink, frames: LatestFrame) {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    appsink.set_property("emit-signals", true);
    appsink.set_property("sync", false);
    appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
    appsink.set_property("drop", true);
    appsink.set_property("enable-last-sample", false);

    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                match frame_from_sample(&sample) {
                    Ok(frame) => {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(
                                frame = frame_num,
                                width = frame.width,
                                height = frame.height,
                                "Preview frame"
                            );
                        }
                        frames.store(frame);
                        Ok(gst::FlowSuccess::Ok)
                    }
                    Err(e) => {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = %e, "Dropping malformed sample");
                        }
                        Err(gst::FlowError::Error)
                    }
                }
            })
            .build(),
    );
}

/// Set PLAYING and wait until the pipeline gets there or reports an error
pub fn start_playing(pipeline: &gst::Pipeline) -> Result<(), String> {
    pipeline
        .set_state(gst::State::Playing)
        .map_err(|e| format!("Failed to start pipeline: {}", e))?;

    let (result, state, pending) =
        pipeline.state(gst::ClockTime::from_seconds(timing::START_TIMEOUT_SECS));
    debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");

    if let Some(bus) = pipeline.bus()
        && let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error])
        && let gst::MessageView::Error(err) = msg.view()
    {
        error!(
            error = %err.error(),
            debug = ?err.debug(),
            source = ?err.src().map(|s| s.name()),
            "GStreamer error during start"
        );
        let _ = pipeline.set_state(gst::State::Null);
        return Err(err.error().to_string());
    }

    if result.is_err() || state != gst::State::Playing {
        let _ = pipeline.set_state(gst::State::Null);
        return Err(format!("Pipeline did not reach PLAYING (state {:?})", state));
    }
    Ok(())
}

/// Shut a pipeline down and wait for the sensor to be released
pub fn stop_pipeline(pipeline: &gst::Pipeline) {
    if let Err(e) = pipeline.set_state(gst::State::Null) {
        warn!(error = %e, "Failed to set pipeline to NULL");
        return;
    }
    let (result, state, _) =
        pipeline.state(gst::ClockTime::from_seconds(timing::STOP_TIMEOUT_SECS));
    debug!(result = ?result, state = ?state, "Pipeline stopped");
}

/// Continuous RGBA preview stream
pub struct PreviewPipeline {
    pipeline: gst::Pipeline,
    appsink: AppSink,
    resolution: Resolution,
}

impl PreviewPipeline {
    /// Build and start the preview at `resolution`
    ///
    /// A sensor that cannot produce `resolution` fails caps negotiation,
    /// which is reported as [`CameraError::UnsupportedResolution`].
    pub fn start(
        camera_name: Option<&str>,
        resolution: Resolution,
        frames: LatestFrame,
        focus: &FocusSettings,
    ) -> Result<Self, CameraError> {
        info!(%resolution, camera = ?camera_name, "Starting preview pipeline");

        let pipeline = launch(&rgba_stream_description(camera_name, resolution))
            .map_err(CameraError::PipelineFailed)?;
        let appsink = appsink(&pipeline).map_err(CameraError::PipelineFailed)?;
        attach_frame_sink(&appsink, frames);

        if let Some(source) = pipeline.by_name(CAMERA_ELEMENT)
            && let Err(e) = apply_focus(&source, focus)
        {
            warn!(error = %e, "Focus settings not applied to preview");
        }

        if let Err(reason) = start_playing(&pipeline) {
            appsink.set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
            return Err(CameraError::UnsupportedResolution { resolution, reason });
        }

        info!(%resolution, "Preview pipeline running");
        Ok(Self {
            pipeline,
            appsink,
            resolution,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The libcamerasrc element, for focus control writes
    pub fn camera_source(&self) -> Option<gst::Element> {
        self.pipeline.by_name(CAMERA_ELEMENT)
    }
}

impl Drop for PreviewPipeline {
    fn drop(&mut self) {
        info!(resolution = %self.resolution, "Stopping preview pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        stop_pipeline(&self.pipeline);
    }
}
