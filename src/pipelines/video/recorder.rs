// SPDX-License-Identifier: GPL-3.0-only

//! Tee-based recording pipeline
//!
//! ```text
//! libcamerasrc ! caps ! tee ─┬─ queue ! videoconvert ! h264 encoder ! h264parse ! mp4mux ! filesink
//!                            └─ queue ! videoconvert ! RGBA ! appsink (preview)
//! ```
//!
//! The sensor can only be opened once, so the recorder replaces the preview
//! pipeline for as long as it runs and keeps feeding the same frame slot.

use super::encoder_selection::{EncoderConfig, select_h264_encoder};
use super::muxer::{create_muxer, link_muxer_to_sink, link_video_to_muxer};
use crate::backends::camera::libcamera::controls::{FocusSettings, apply_focus};
use crate::backends::camera::libcamera::pipeline::{
    CAMERA_ELEMENT, SINK_ELEMENT, attach_frame_sink, stop_pipeline,
};
use crate::backends::camera::types::LatestFrame;
use crate::constants::{pipeline as pipeline_consts, timing};
use crate::errors::RecordingError;
use crate::model::Resolution;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Running recording
#[derive(Debug)]
pub struct VideoRecorder {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    file_path: PathBuf,
    resolution: Resolution,
}

fn make(factory: &str) -> Result<gst::Element, RecordingError> {
    gst::ElementFactory::make(factory)
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create {}: {}", factory, e)))
}

fn link(src: &gst::Element, dst: &gst::Element) -> Result<(), RecordingError> {
    src.link(dst).map_err(|_| {
        RecordingError::StartFailed(format!("Failed to link {} to {}", src.name(), dst.name()))
    })
}

impl VideoRecorder {
    /// Build the recording pipeline; nothing touches the sensor until [`start`](Self::start)
    pub fn new(
        camera_name: Option<&str>,
        resolution: Resolution,
        output_path: PathBuf,
        config: EncoderConfig,
        frames: LatestFrame,
        focus: &FocusSettings,
    ) -> Result<Self, RecordingError> {
        info!(
            camera = ?camera_name,
            %resolution,
            output = %output_path.display(),
            bitrate_kbps = config.bitrate_kbps(),
            "Creating video recorder"
        );

        gst::init().map_err(|e| {
            RecordingError::StartFailed(format!("Failed to initialize GStreamer: {}", e))
        })?;

        let encoder = select_h264_encoder(&config)?;
        let pipeline = gst::Pipeline::new();

        let mut source_builder =
            gst::ElementFactory::make("libcamerasrc").name(CAMERA_ELEMENT);
        if let Some(name) = camera_name.filter(|n| !n.is_empty()) {
            source_builder = source_builder.property("camera-name", name);
        }
        let source = source_builder.build().map_err(|e| {
            RecordingError::StartFailed(format!("Failed to create libcamerasrc: {}", e))
        })?;
        if let Err(e) = apply_focus(&source, focus) {
            warn!(error = %e, "Focus settings not applied to recording");
        }

        let source_caps = gst::Caps::builder("video/x-raw")
            .field("width", resolution.width as i32)
            .field("height", resolution.height as i32)
            .build();
        let capsfilter = gst::ElementFactory::make("capsfilter")
            .property("caps", &source_caps)
            .build()
            .map_err(|e| RecordingError::StartFailed(format!("Failed to create capsfilter: {}", e)))?;
        let tee = make("tee")?;

        let record_queue = make("queue")?;
        let record_convert = make("videoconvert")?;
        let muxer = create_muxer(&output_path)?;

        let preview_queue = gst::ElementFactory::make("queue")
            .property_from_str("leaky", "downstream")
            .build()
            .map_err(|e| RecordingError::StartFailed(format!("Failed to create queue: {}", e)))?;
        let preview_convert = make("videoconvert")?;
        let appsink = gst::ElementFactory::make("appsink")
            .name(SINK_ELEMENT)
            .build()
            .map_err(|e| RecordingError::StartFailed(format!("Failed to create appsink: {}", e)))?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(|_| RecordingError::StartFailed("Failed to cast to AppSink".to_string()))?;
        appsink.set_caps(Some(
            &gst::Caps::builder("video/x-raw")
                .field("format", pipeline_consts::OUTPUT_FORMAT)
                .build(),
        ));
        attach_frame_sink(&appsink, frames);

        pipeline
            .add_many([
                &source,
                &capsfilter,
                &tee,
                &record_queue,
                &record_convert,
                &encoder.encoder,
                &encoder.parser,
                &muxer.muxer,
                &muxer.filesink,
                &preview_queue,
                &preview_convert,
                appsink.upcast_ref::<gst::Element>(),
            ])
            .map_err(|e| {
                RecordingError::StartFailed(format!("Failed to add elements to pipeline: {}", e))
            })?;

        link(&source, &capsfilter)?;
        link(&capsfilter, &tee)?;

        link(&tee, &record_queue)?;
        link(&record_queue, &record_convert)?;
        link(&record_convert, &encoder.encoder)?;
        link(&encoder.encoder, &encoder.parser)?;
        link_video_to_muxer(&encoder.parser, &muxer.muxer)?;
        link_muxer_to_sink(&muxer.muxer, &muxer.filesink)?;

        link(&tee, &preview_queue)?;
        link(&preview_queue, &preview_convert)?;
        link(&preview_convert, appsink.upcast_ref::<gst::Element>())?;

        debug!(encoder = encoder.name, "Recording pipeline linked");
        Ok(Self {
            pipeline,
            appsink,
            file_path: muxer.output_path,
            resolution,
        })
    }

    /// Start writing
    pub fn start(&self) -> Result<(), RecordingError> {
        info!("Starting video recording");
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            RecordingError::StartFailed(format!("Failed to start recording: {}", e))
        })?;

        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| RecordingError::StartFailed("No bus available".to_string()))?;
        if let Some(msg) = bus.timed_pop_filtered(
            gst::ClockTime::from_mseconds(500),
            &[gst::MessageType::Error, gst::MessageType::Warning],
        ) {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    error!(
                        error = %err.error(),
                        debug = ?err.debug(),
                        source = ?err.src().map(|s| s.name()),
                        "GStreamer error during start"
                    );
                    let _ = self.pipeline.set_state(gst::State::Null);
                    return Err(RecordingError::StartFailed(err.error().to_string()));
                }
                gst::MessageView::Warning(warning) => {
                    warn!(
                        warning = %warning.error(),
                        debug = ?warning.debug(),
                        source = ?warning.src().map(|s| s.name()),
                        "GStreamer warning during start"
                    );
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The libcamerasrc element, for focus control writes
    pub fn camera_source(&self) -> Option<gst::Element> {
        self.pipeline.by_name(CAMERA_ELEMENT)
    }

    /// Send EOS, wait for the muxer to finish the file, then release the sensor
    pub fn stop(self) -> Result<PathBuf, RecordingError> {
        info!("Stopping video recording");

        if !self.pipeline.send_event(gst::event::Eos::new()) {
            warn!("Failed to send EOS event to pipeline");
        }

        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| RecordingError::StopFailed("No bus available".to_string()))?;
        let outcome = match bus.timed_pop_filtered(
            gst::ClockTime::from_seconds(timing::EOS_TIMEOUT_SECS),
            &[gst::MessageType::Eos, gst::MessageType::Error],
        ) {
            Some(msg) => match msg.view() {
                gst::MessageView::Eos(..) => {
                    debug!("EOS reached, file finalized");
                    Ok(())
                }
                gst::MessageView::Error(err) => {
                    error!(error = %err.error(), debug = ?err.debug(), "Error while finalizing recording");
                    Err(RecordingError::StopFailed(err.error().to_string()))
                }
                _ => Ok(()),
            },
            None => {
                warn!(timeout_secs = timing::EOS_TIMEOUT_SECS, "Timed out waiting for EOS");
                Err(RecordingError::StopFailed(
                    "Timed out waiting for the file to be finalized".to_string(),
                ))
            }
        };

        // Drop runs the NULL transition
        let path = self.file_path.clone();
        drop(self);
        outcome?;

        info!(path = %path.display(), "Recording saved");
        Ok(path)
    }
}

impl Drop for VideoRecorder {
    fn drop(&mut self) {
        self.appsink
            .set_callbacks(gst_app::AppSinkCallbacks::builder().build());
        stop_pipeline(&self.pipeline);
    }
}
