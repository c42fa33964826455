// SPDX-License-Identifier: GPL-3.0-only

//! Crop rectangle drag interaction
//!
//! ```text
//!            pointer_down (inside preview)
//!   Idle ───────────────────────────────▶ Dragging { anchor }
//!    ▲                                        │  pointer_move: crop_rect = anchor..pointer
//!    └────────────────────────────────────────┘
//!            pointer_up: finalize (zero area clears)
//! ```

use crate::geometry::{Point, Rectangle};
use crate::model::ApplicationState;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum CropState {
    #[default]
    Idle,
    Dragging {
        anchor: Point,
    },
}

/// Pointer-driven crop selection over the preview surface
#[derive(Clone, Debug, Default)]
pub struct CropTool {
    state: CropState,
}

impl CropTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, CropState::Dragging { .. })
    }

    /// Start a drag if the press landed on the preview
    ///
    /// Returns true when a drag started.
    pub fn pointer_down(&mut self, app: &ApplicationState, point: Point) -> bool {
        if !app.preview_size.contains(point) {
            return false;
        }
        debug!(x = point.x, y = point.y, "Crop drag started");
        self.state = CropState::Dragging { anchor: point };
        true
    }

    /// Update the live rectangle; returns true when `crop_rect` changed
    pub fn pointer_move(&mut self, app: &mut ApplicationState, point: Point) -> bool {
        let CropState::Dragging { anchor } = self.state else {
            return false;
        };
        let rect = Rectangle::from_corners(anchor, point).clamp_to(app.preview_size);
        let changed = app.crop_rect != Some(rect);
        app.crop_rect = Some(rect);
        changed
    }

    /// Finish the drag; a rectangle without area clears the crop
    ///
    /// Returns true when a drag was in progress.
    pub fn pointer_up(&mut self, app: &mut ApplicationState, point: Point) -> bool {
        let CropState::Dragging { anchor } = self.state else {
            return false;
        };
        self.state = CropState::Idle;

        let rect = Rectangle::from_corners(anchor, point).clamp_to(app.preview_size);
        if rect.is_empty() {
            debug!("Crop cleared by click");
            app.crop_rect = None;
        } else {
            debug!(crop = %rect, "Crop applied");
            app.crop_rect = Some(rect);
        }
        true
    }

    /// Abandon a drag without touching the state, e.g. when the stream restarts
    pub fn cancel(&mut self) {
        self.state = CropState::Idle;
    }
}
