// SPDX-License-Identifier: GPL-3.0-only

//! Control event and session command handlers
//!
//! Control events update the state on the UI thread first. The session
//! command they produce runs inline for focus property writes and on a
//! blocking worker for everything that restarts a pipeline; the result
//! comes back as [`Message::CommandFinished`].

use crate::app::state::{AppModel, Message};
use crate::constants::CAPTURE_RESOLUTIONS;
use crate::controls::{self, CommandOutput, ControlEvent, SessionCommand};
use crate::errors::{AppError, AppResult, CameraError};
use crate::model::CaptureFormat;
use cosmic::Task;
use std::sync::Arc;
use tracing::{debug, error, info};

impl AppModel {
    /// Create a delayed task that sends a message after the specified milliseconds
    pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
                message
            },
            cosmic::Action::App,
        )
    }

    pub(crate) fn handle_control(&mut self, event: ControlEvent) -> Task<cosmic::Action<Message>> {
        let theme_before = self.state.theme;
        let was_recording = self.state.is_recording;
        let outcome = controls::dispatch(&mut self.state, event);
        let mut tasks = Vec::new();

        if self.state.is_recording && !was_recording {
            // Start the blink in its lit phase
            self.blink_epoch = std::time::Instant::now();
        }

        if let Some(feedback) = outcome.feedback {
            tasks.push(self.notify(feedback));
        }
        if let Some(command) = outcome.command {
            tasks.push(self.run_command(command));
        }
        if self.state.theme != theme_before {
            tasks.push(cosmic::command::set_theme(self.state.theme.cosmic_theme()));
        }
        if outcome.repaint {
            self.render_preview();
        }

        Task::batch(tasks)
    }

    /// Send a command to the session
    fn run_command(&mut self, command: SessionCommand) -> Task<cosmic::Action<Message>> {
        if !command.is_blocking() {
            let result = controls::execute(self.session.as_ref(), &command);
            return self.handle_command_finished(command, result);
        }

        self.pending_commands += 1;
        debug!(?command, pending = self.pending_commands, "Running session command");
        let session = Arc::clone(&self.session);
        Task::perform(
            async move {
                let worker_command = command.clone();
                let result = tokio::task::spawn_blocking(move || {
                    controls::execute(session.as_ref(), &worker_command)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(AppError::Camera(CameraError::PipelineFailed(format!(
                        "Task join error: {}",
                        e
                    ))))
                });
                (command, result)
            },
            |(command, result)| cosmic::Action::App(Message::CommandFinished(command, result)),
        )
    }

    pub(crate) fn handle_command_finished(
        &mut self,
        command: SessionCommand,
        result: AppResult<CommandOutput>,
    ) -> Task<cosmic::Action<Message>> {
        if command.is_blocking() {
            self.pending_commands = self.pending_commands.saturating_sub(1);
        }
        match &result {
            Ok(output) => info!(?command, ?output, "Session command finished"),
            Err(e) => error!(?command, error = %e, "Session command failed"),
        }

        if matches!(command, SessionCommand::Configure { .. }) {
            // The frame slot now holds frames of a different size
            self.overlay.crop.cancel();
            self.current_frame = None;
        }

        let feedback = controls::complete(&mut self.state, &command, result);
        self.render_preview();
        match feedback {
            Some(feedback) => self.notify(feedback),
            None => Task::none(),
        }
    }

    pub(crate) fn handle_select_capture_resolution(
        &mut self,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        match CAPTURE_RESOLUTIONS.get(index) {
            Some(resolution) => {
                self.handle_control(ControlEvent::SelectCaptureResolution(*resolution))
            }
            None => Task::none(),
        }
    }

    pub(crate) fn handle_select_capture_format(
        &mut self,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        match CaptureFormat::ALL.get(index) {
            Some(format) => self.handle_control(ControlEvent::SelectCaptureFormat(*format)),
            None => Task::none(),
        }
    }
}
