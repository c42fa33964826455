// SPDX-License-Identifier: GPL-3.0-only

//! MP4 muxing for recordings

use crate::errors::RecordingError;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Muxer and the file sink it feeds
pub struct MuxerConfig {
    pub muxer: gst::Element,
    pub filesink: gst::Element,
    pub output_path: PathBuf,
}

/// Create `mp4mux` and a filesink writing to `output_path`
pub fn create_muxer(output_path: &Path) -> Result<MuxerConfig, RecordingError> {
    info!(path = %output_path.display(), "Creating muxer");

    let location = output_path.to_str().ok_or_else(|| {
        RecordingError::StartFailed(format!(
            "Output path is not valid UTF-8: {}",
            output_path.display()
        ))
    })?;

    let muxer = gst::ElementFactory::make("mp4mux")
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create mp4mux: {}", e)))?;

    // Write the moov atom on EOS so the file is seekable
    if muxer.has_property("streamable") {
        muxer.set_property("streamable", false);
    }

    let filesink = gst::ElementFactory::make("filesink")
        .property("location", location)
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create filesink: {}", e)))?;

    debug!("Muxer and filesink created");
    Ok(MuxerConfig {
        muxer,
        filesink,
        output_path: output_path.to_path_buf(),
    })
}

/// Link the encoded stream (parser output) into the muxer
pub fn link_video_to_muxer(parser: &gst::Element, muxer: &gst::Element) -> Result<(), RecordingError> {
    parser
        .link(muxer)
        .map_err(|_| RecordingError::StartFailed("Failed to link parser to muxer".to_string()))?;
    debug!("Video stream linked to muxer");
    Ok(())
}

pub fn link_muxer_to_sink(muxer: &gst::Element, filesink: &gst::Element) -> Result<(), RecordingError> {
    muxer
        .link(filesink)
        .map_err(|_| RecordingError::StartFailed("Failed to link muxer to filesink".to_string()))?;
    debug!("Muxer linked to filesink");
    Ok(())
}
