// SPDX-License-Identifier: GPL-3.0-only

//! Focus control handlers

use crate::app::state::{AppModel, Message};
use crate::controls::ControlEvent;
use crate::fl;
use crate::model::{FocusMode, focus_distance_mm};
use cosmic::Task;

impl AppModel {
    pub(crate) fn handle_select_focus_mode(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        match FocusMode::ALL.get(index) {
            Some(mode) => self.handle_control(ControlEvent::SetFocusMode(*mode)),
            None => Task::none(),
        }
    }

    /// Label under the manual focus slider
    pub(crate) fn focus_distance_label(&self) -> String {
        let position = self.state.manual_focus_position;
        match focus_distance_mm(position) {
            Some(distance) => fl!(
                "focus-distance",
                position = format!("{:.2}", position),
                distance = format!("{:.0}", distance)
            ),
            None => fl!("focus-infinity", position = format!("{:.2}", position)),
        }
    }
}
