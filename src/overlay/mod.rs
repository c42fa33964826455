// SPDX-License-Identifier: GPL-3.0-only

//! Interactive overlays drawn on top of the preview
//!
//! - [`crop`]: drag-to-select crop rectangle applied to stills
//! - [`magnifier`]: zoomed view of the frame around the pointer

pub mod crop;
pub mod magnifier;

pub use crop::CropTool;
pub use magnifier::{Magnifier, MagnifierLayout};

use crate::geometry::Point;

/// Pointer state the overlays react to
#[derive(Clone, Debug, Default)]
pub struct OverlayState {
    pub crop: CropTool,
    /// Last pointer position over the preview; `None` once it left
    pub pointer: Option<Point>,
    /// Lit phase of the recording indicator blink
    pub record_blink_on: bool,
}

impl OverlayState {
    /// Pointer position the magnifier should follow, if any
    ///
    /// The magnifier stays hidden while a crop drag is in progress.
    pub fn magnifier_pointer(&self, enabled: bool) -> Option<Point> {
        if !enabled || self.crop.is_dragging() {
            return None;
        }
        self.pointer
    }

    /// Whether the recording dot is drawn this frame
    pub fn record_indicator_visible(&self, recording: bool) -> bool {
        recording && self.record_blink_on
    }
}
