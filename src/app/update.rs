// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function routes each message to a handler method in
//! the `handlers` submodules:
//!
//! - `handlers::ui`: About drawer, external links, notifications
//! - `handlers::camera`: Preview refresh and pointer input
//! - `handlers::capture`: Control events and session commands
//! - `handlers::focus`: Focus mode and manual lens position

use crate::app::state::{AppModel, Message};
use crate::controls::ControlEvent;
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Preview =====
            Message::Tick => self.handle_tick(),
            Message::PointerMoved(point) => self.handle_pointer_moved(point),
            Message::PointerPressed => self.handle_pointer_pressed(),
            Message::PointerReleased => self.handle_pointer_released(),
            Message::PointerLeft => self.handle_pointer_left(),

            // ===== Controls =====
            Message::Control(event) => self.handle_control(event),
            Message::SelectResolution(index) => self.handle_select_resolution(index),
            Message::SelectCaptureResolution(index) => {
                self.handle_select_capture_resolution(index)
            }
            Message::SelectCaptureFormat(index) => self.handle_select_capture_format(index),
            Message::SelectFocusMode(index) => self.handle_select_focus_mode(index),
            Message::SetLensPosition(position) => {
                self.handle_control(ControlEvent::SetLensPosition(position))
            }

            // ===== Session =====
            Message::CommandFinished(command, result) => {
                self.handle_command_finished(command, result)
            }

            // ===== Notifications =====
            Message::ClearNotification(id) => self.handle_clear_notification(id),
        }
    }
}
