// SPDX-License-Identifier: GPL-3.0-only

//! Preview refresh and pointer handlers

use crate::app::state::{AppModel, Message};
use crate::constants::{PREVIEW_RESOLUTIONS, timing};
use crate::controls::ControlEvent;
use crate::geometry::Point;
use crate::preview::PreviewRenderer;
use cosmic::Task;
use cosmic::widget::image::Handle;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

impl AppModel {
    /// Redraw the preview image from the current frame and overlays
    pub(crate) fn render_preview(&mut self) {
        let image = PreviewRenderer::render(
            self.current_frame.as_deref(),
            &self.state,
            &self.overlay,
            &self.magnifier,
        );
        let (width, height) = image.dimensions();
        self.preview_handle = Handle::from_rgba(width, height, image.into_raw());
    }

    /// Pull the newest frame unless the preview is paused
    pub(crate) fn handle_tick(&mut self) -> Task<cosmic::Action<Message>> {
        let mut dirty = self.advance_record_blink();

        if !self.state.preview_paused
            && let Some(frame) = self.session.latest_frame()
            && !self
                .current_frame
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &frame))
        {
            self.current_frame = Some(frame);
            dirty = true;
        }

        if dirty {
            self.render_preview();
        }
        Task::none()
    }

    /// Flip the recording dot every half period; true when it changed
    fn advance_record_blink(&mut self) -> bool {
        let lit = self.state.is_recording && record_blink_lit(self.blink_epoch.elapsed());
        let changed = lit != self.overlay.record_blink_on;
        self.overlay.record_blink_on = lit;
        changed
    }

    pub(crate) fn handle_pointer_moved(&mut self, point: Point) -> Task<cosmic::Action<Message>> {
        self.overlay.pointer = Some(point);
        let crop_changed = self.overlay.crop.pointer_move(&mut self.state, point);
        if crop_changed || self.state.magnifier_enabled {
            self.render_preview();
        }
        Task::none()
    }

    /// mouse_area presses carry no position; the last move is used
    pub(crate) fn handle_pointer_pressed(&mut self) -> Task<cosmic::Action<Message>> {
        if let Some(point) = self.overlay.pointer
            && self.overlay.crop.pointer_down(&self.state, point)
        {
            self.render_preview();
        }
        Task::none()
    }

    pub(crate) fn handle_pointer_released(&mut self) -> Task<cosmic::Action<Message>> {
        if let Some(point) = self.overlay.pointer
            && self.overlay.crop.pointer_up(&mut self.state, point)
        {
            debug!(crop = ?self.state.crop_rect, "Crop finished");
            self.render_preview();
        }
        Task::none()
    }

    /// Hide the magnifier; a drag in progress ends at the last position
    pub(crate) fn handle_pointer_left(&mut self) -> Task<cosmic::Action<Message>> {
        if let Some(point) = self.overlay.pointer.take() {
            self.overlay.crop.pointer_up(&mut self.state, point);
        }
        self.render_preview();
        Task::none()
    }

    pub(crate) fn handle_select_resolution(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if self.is_busy() {
            debug!(index, "Session busy, ignoring resolution change");
            return Task::none();
        }
        match PREVIEW_RESOLUTIONS.get(index) {
            Some(resolution) => self.handle_control(ControlEvent::SelectResolution(*resolution)),
            None => Task::none(),
        }
    }
}

/// Lit during even half periods since `elapsed` started counting
pub(crate) fn record_blink_lit(elapsed: Duration) -> bool {
    (elapsed.as_millis() / u128::from(timing::RECORD_BLINK_MS)) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_alternates_every_half_period() {
        assert!(record_blink_lit(Duration::from_millis(0)));
        assert!(record_blink_lit(Duration::from_millis(499)));
        assert!(!record_blink_lit(Duration::from_millis(500)));
        assert!(!record_blink_lit(Duration::from_millis(999)));
        assert!(record_blink_lit(Duration::from_millis(1000)));
    }
}
