// SPDX-License-Identifier: GPL-3.0-only

//! Control panel logic
//!
//! Every button, dropdown and slider produces a [`ControlEvent`]. Handling
//! one is split in three steps so the UI can run the slow part elsewhere:
//!
//! ```text
//! dispatch(state, event)      → state updated optimistically, maybe a SessionCommand
//! execute(session, &command)  → talks to the camera (may block)
//! complete(state, &command, result) → rollback on failure, user feedback
//! ```
//!
//! [`apply`] runs all three inline.

use crate::backends::camera::CameraSession;
use crate::constants::focus;
use crate::errors::{AppError, AppResult};
use crate::geometry::Rotation;
use crate::model::{ApplicationState, CaptureFormat, CaptureRequest, FocusMode, Resolution};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Named user actions from the control panel
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    SelectResolution(Resolution),
    SelectCaptureResolution(Resolution),
    SelectCaptureFormat(CaptureFormat),
    Capture,
    StartRecording,
    StopRecording,
    ToggleRecording,
    SetFocusMode(FocusMode),
    TriggerAutofocus,
    /// Lens position in dioptres from the manual focus slider
    SetLensPosition(f32),
    RotateClockwise,
    RotateCounterClockwise,
    ToggleTheme,
    ToggleMagnifier,
    TogglePreviewPause,
    ClearCrop,
}

/// Work for the camera session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    Configure {
        resolution: Resolution,
        previous: Resolution,
    },
    Capture(CaptureRequest),
    StartRecording,
    StopRecording,
    SetFocusMode {
        mode: FocusMode,
        previous: FocusMode,
    },
    TriggerAutofocus,
    SetLensPosition(f32),
}

impl SessionCommand {
    /// Commands that restart pipelines and must not run on the UI thread
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            SessionCommand::Configure { .. }
                | SessionCommand::Capture(_)
                | SessionCommand::StartRecording
                | SessionCommand::StopRecording
        )
    }
}

/// Successful session results
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutput {
    Applied,
    /// A file was written (or opened for writing)
    Saved(PathBuf),
    /// Focus mode set; carries the session's lens position if known
    FocusMode { lens_position: Option<f32> },
}

/// Something worth telling the user
#[derive(Clone, Debug, PartialEq)]
pub enum Feedback {
    PhotoSaved(PathBuf),
    RecordingStarted(PathBuf),
    RecordingSaved(PathBuf),
    ResolutionChanged(Resolution),
    /// The action needs the camera, which is busy recording
    BusyRecording,
    /// One-shot autofocus only works in auto-one-shot mode
    AutofocusNeedsOneShot,
    Error(AppError),
}

impl Feedback {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Feedback::Error(_) | Feedback::BusyRecording | Feedback::AutofocusNeedsOneShot
        )
    }
}

/// Outcome of handling one event on the UI thread
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dispatch {
    pub command: Option<SessionCommand>,
    pub feedback: Option<Feedback>,
    /// The preview must be redrawn even without a new frame
    pub repaint: bool,
}

impl Dispatch {
    fn none() -> Self {
        Self::default()
    }

    fn command(command: SessionCommand) -> Self {
        Self {
            command: Some(command),
            ..Self::default()
        }
    }

    fn feedback(feedback: Feedback) -> Self {
        Self {
            feedback: Some(feedback),
            ..Self::default()
        }
    }

    fn repaint() -> Self {
        Self {
            repaint: true,
            ..Self::default()
        }
    }
}

/// Update the state for `event` and decide what the session must do
pub fn dispatch(state: &mut ApplicationState, event: ControlEvent) -> Dispatch {
    debug!(?event, "Control event");
    match event {
        ControlEvent::SelectResolution(resolution) => select_resolution(state, resolution),
        ControlEvent::SelectCaptureResolution(resolution) => {
            state.capture_resolution = resolution;
            Dispatch::none()
        }
        ControlEvent::SelectCaptureFormat(format) => {
            state.capture_format = format;
            Dispatch::none()
        }
        ControlEvent::Capture => capture(state),
        ControlEvent::StartRecording => start_recording(state),
        ControlEvent::StopRecording => stop_recording(state),
        ControlEvent::ToggleRecording => {
            if state.is_recording {
                stop_recording(state)
            } else {
                start_recording(state)
            }
        }
        ControlEvent::SetFocusMode(mode) => set_focus_mode(state, mode),
        ControlEvent::TriggerAutofocus => {
            if state.focus_mode == FocusMode::AutoOneShot {
                Dispatch::command(SessionCommand::TriggerAutofocus)
            } else {
                Dispatch::feedback(Feedback::AutofocusNeedsOneShot)
            }
        }
        ControlEvent::SetLensPosition(position) => set_lens_position(state, position),
        ControlEvent::RotateClockwise => {
            let rotation = state.rotation.clockwise();
            rotate(state, rotation)
        }
        ControlEvent::RotateCounterClockwise => {
            let rotation = state.rotation.counter_clockwise();
            rotate(state, rotation)
        }
        ControlEvent::ToggleTheme => {
            state.theme = state.theme.toggled();
            info!(theme = ?state.theme, "Theme changed");
            Dispatch::repaint()
        }
        ControlEvent::ToggleMagnifier => {
            state.magnifier_enabled = !state.magnifier_enabled;
            Dispatch::repaint()
        }
        ControlEvent::TogglePreviewPause => {
            state.preview_paused = !state.preview_paused;
            Dispatch::repaint()
        }
        ControlEvent::ClearCrop => {
            state.crop_rect = None;
            Dispatch::repaint()
        }
    }
}

fn select_resolution(state: &mut ApplicationState, resolution: Resolution) -> Dispatch {
    if resolution == state.resolution {
        return Dispatch::none();
    }
    if state.is_recording {
        return Dispatch::feedback(Feedback::BusyRecording);
    }
    let previous = state.resolution;
    state.resolution = resolution;
    Dispatch::command(SessionCommand::Configure {
        resolution,
        previous,
    })
}

fn capture(state: &ApplicationState) -> Dispatch {
    if state.is_recording {
        return Dispatch::feedback(Feedback::BusyRecording);
    }
    Dispatch::command(SessionCommand::Capture(state.capture_request()))
}

fn start_recording(state: &mut ApplicationState) -> Dispatch {
    if state.is_recording {
        debug!("Already recording, ignoring start");
        return Dispatch::none();
    }
    state.is_recording = true;
    Dispatch::command(SessionCommand::StartRecording)
}

fn stop_recording(state: &mut ApplicationState) -> Dispatch {
    if !state.is_recording {
        debug!("Not recording, ignoring stop");
        return Dispatch::none();
    }
    state.is_recording = false;
    Dispatch::command(SessionCommand::StopRecording)
}

fn set_focus_mode(state: &mut ApplicationState, mode: FocusMode) -> Dispatch {
    if mode == state.focus_mode {
        return Dispatch::none();
    }
    let previous = state.focus_mode;
    state.focus_mode = mode;
    Dispatch::command(SessionCommand::SetFocusMode { mode, previous })
}

fn set_lens_position(state: &mut ApplicationState, position: f32) -> Dispatch {
    if state.focus_mode != FocusMode::Manual {
        return Dispatch::none();
    }
    let position = position.clamp(0.0, focus::LENS_POSITION_MAX);
    state.manual_focus_position = position;
    Dispatch::command(SessionCommand::SetLensPosition(position))
}

/// The crop was drawn on the old orientation and no longer lines up
fn rotate(state: &mut ApplicationState, rotation: Rotation) -> Dispatch {
    state.rotation = rotation;
    state.crop_rect = None;
    Dispatch::repaint()
}

/// Run a command against the session
pub fn execute(session: &dyn CameraSession, command: &SessionCommand) -> AppResult<CommandOutput> {
    match command {
        SessionCommand::Configure { resolution, .. } => {
            session.configure(*resolution)?;
            Ok(CommandOutput::Applied)
        }
        SessionCommand::Capture(request) => Ok(CommandOutput::Saved(session.capture(request)?)),
        SessionCommand::StartRecording => Ok(CommandOutput::Saved(session.start_recording()?)),
        SessionCommand::StopRecording => Ok(CommandOutput::Saved(session.stop_recording()?)),
        SessionCommand::SetFocusMode { mode, .. } => {
            session.set_focus_mode(*mode)?;
            Ok(CommandOutput::FocusMode {
                lens_position: session.lens_position(),
            })
        }
        SessionCommand::TriggerAutofocus => {
            session.trigger_autofocus()?;
            Ok(CommandOutput::Applied)
        }
        SessionCommand::SetLensPosition(position) => {
            session.set_lens_position(*position)?;
            Ok(CommandOutput::Applied)
        }
    }
}

/// Fold a session result back into the state
pub fn complete(
    state: &mut ApplicationState,
    command: &SessionCommand,
    result: AppResult<CommandOutput>,
) -> Option<Feedback> {
    let output = match result {
        Ok(output) => output,
        Err(error) => {
            warn!(?command, %error, "Camera command failed");
            rollback(state, command);
            return Some(Feedback::Error(error));
        }
    };

    match (command, output) {
        (SessionCommand::Configure { resolution, .. }, _) => {
            state.resolution = *resolution;
            state.crop_rect = None;
            Some(Feedback::ResolutionChanged(*resolution))
        }
        (SessionCommand::Capture(_), CommandOutput::Saved(path)) => {
            Some(Feedback::PhotoSaved(path))
        }
        (SessionCommand::StartRecording, CommandOutput::Saved(path)) => {
            Some(Feedback::RecordingStarted(path))
        }
        (SessionCommand::StopRecording, CommandOutput::Saved(path)) => {
            Some(Feedback::RecordingSaved(path))
        }
        (
            SessionCommand::SetFocusMode {
                mode: FocusMode::Manual,
                ..
            },
            CommandOutput::FocusMode {
                lens_position: Some(position),
            },
        ) => {
            state.manual_focus_position = position.clamp(0.0, focus::LENS_POSITION_MAX);
            None
        }
        _ => None,
    }
}

/// Release the camera on exit
///
/// mp4mux only writes the file index at end of stream, so an open
/// recording has to be finalized before the process goes away.
pub fn shutdown(session: &dyn CameraSession) -> Option<Feedback> {
    match session.close() {
        Ok(Some(path)) => {
            info!(path = %path.display(), "Recording finalized on exit");
            Some(Feedback::RecordingSaved(path))
        }
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "Recording could not be finalized on exit");
            Some(Feedback::Error(error.into()))
        }
    }
}

fn rollback(state: &mut ApplicationState, command: &SessionCommand) {
    match command {
        // A newer request already replaced the value; leave it alone
        SessionCommand::Configure {
            resolution,
            previous,
        } if state.resolution == *resolution => state.resolution = *previous,
        SessionCommand::StartRecording => state.is_recording = false,
        SessionCommand::SetFocusMode { mode, previous } if state.focus_mode == *mode => {
            state.focus_mode = *previous
        }
        _ => {}
    }
}

/// Dispatch, execute and complete an event in one go
pub fn apply(
    state: &mut ApplicationState,
    session: &dyn CameraSession,
    event: ControlEvent,
) -> Dispatch {
    let mut outcome = dispatch(state, event);
    if let Some(command) = outcome.command.take() {
        let result = execute(session, &command);
        if let Some(feedback) = complete(state, &command, result) {
            outcome.feedback = Some(feedback);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CameraError;
    use crate::geometry::Rectangle;

    #[test]
    fn test_capture_blocked_while_recording() {
        let mut state = ApplicationState {
            is_recording: true,
            ..ApplicationState::default()
        };
        let outcome = dispatch(&mut state, ControlEvent::Capture);
        assert_eq!(outcome.command, None);
        assert_eq!(outcome.feedback, Some(Feedback::BusyRecording));
    }

    #[test]
    fn test_configure_failure_restores_resolution() {
        let mut state = ApplicationState::default();
        let previous = state.resolution;
        let outcome = dispatch(
            &mut state,
            ControlEvent::SelectResolution(Resolution::new(1920, 1080)),
        );
        let command = outcome.command.unwrap();
        assert_eq!(state.resolution, Resolution::new(1920, 1080));

        let feedback = complete(
            &mut state,
            &command,
            Err(AppError::Camera(CameraError::Busy)),
        );
        assert_eq!(state.resolution, previous);
        assert!(feedback.unwrap().is_error());
    }

    #[test]
    fn test_rotation_clears_crop() {
        let mut state = ApplicationState {
            crop_rect: Some(Rectangle::new(1.0, 1.0, 5.0, 5.0)),
            ..ApplicationState::default()
        };
        let outcome = dispatch(&mut state, ControlEvent::RotateCounterClockwise);
        assert!(outcome.repaint);
        assert_eq!(state.rotation, Rotation::Deg270);
        assert_eq!(state.crop_rect, None);
    }

    #[test]
    fn test_lens_position_ignored_outside_manual() {
        let mut state = ApplicationState::default();
        let before = state.manual_focus_position;
        let outcome = dispatch(&mut state, ControlEvent::SetLensPosition(2.0));
        assert_eq!(outcome, Dispatch::default());
        assert_eq!(state.manual_focus_position, before);
    }

    #[test]
    fn test_only_camera_commands_block() {
        assert!(SessionCommand::StartRecording.is_blocking());
        assert!(!SessionCommand::TriggerAutofocus.is_blocking());
        assert!(!SessionCommand::SetLensPosition(1.0).is_blocking());
    }
}
