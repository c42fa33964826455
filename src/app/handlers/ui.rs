// SPDX-License-Identifier: GPL-3.0-only

//! UI navigation and notification handlers

use crate::app::state::{AppModel, ContextPage, Message, Notification};
use crate::constants::timing;
use crate::controls::Feedback;
use crate::fl;
use cosmic::Task;
use tracing::{error, info};

impl AppModel {
    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    /// Show feedback on the status line and schedule its expiry
    pub(crate) fn notify(&mut self, feedback: Feedback) -> Task<cosmic::Action<Message>> {
        let text = feedback_text(&feedback);
        let is_error = feedback.is_error();
        if is_error {
            info!(message = %text, "Showing error notification");
        }

        self.notification_seq += 1;
        let id = self.notification_seq;
        self.notification = Some(Notification { id, text, is_error });
        Self::delay_task(
            timing::NOTIFICATION_TIMEOUT_MS,
            Message::ClearNotification(id),
        )
    }

    pub(crate) fn handle_clear_notification(&mut self, id: u64) -> Task<cosmic::Action<Message>> {
        // A newer notification keeps its own timer
        if self.notification.as_ref().is_some_and(|n| n.id == id) {
            self.notification = None;
        }
        Task::none()
    }
}

/// Localized status line text
pub(crate) fn feedback_text(feedback: &Feedback) -> String {
    match feedback {
        Feedback::PhotoSaved(path) => fl!("photo-saved", path = path.display().to_string()),
        Feedback::RecordingStarted(path) => {
            fl!("recording-started", path = path.display().to_string())
        }
        Feedback::RecordingSaved(path) => {
            fl!("recording-saved", path = path.display().to_string())
        }
        Feedback::ResolutionChanged(resolution) => {
            fl!("resolution-changed", resolution = resolution.to_string())
        }
        Feedback::BusyRecording => fl!("busy-recording"),
        Feedback::AutofocusNeedsOneShot => fl!("autofocus-needs-one-shot"),
        Feedback::Error(error) => fl!("error-message", error = error.to_string()),
    }
}
