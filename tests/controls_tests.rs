// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the control panel against a fake camera session

use picam::backends::camera::libcamera::{FocusControl, FocusSettings};
use picam::backends::camera::{CameraFrame, CameraSession};
use picam::controls::{self, CommandOutput, ControlEvent, Feedback, SessionCommand};
use picam::errors::{AppError, CameraError, CaptureError, FocusError, RecordingError};
use picam::geometry::{Rectangle, Rotation};
use picam::model::{ApplicationState, CaptureFormat, CaptureRequest, FocusMode, Resolution, Theme};
use picam::overlay::{Magnifier, OverlayState};
use picam::preview::{Palette, PreviewRenderer};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Records every call; failures are switched on per operation
#[derive(Default)]
struct FakeSession {
    calls: Mutex<Vec<String>>,
    captures: Mutex<Vec<CaptureRequest>>,
    fail_configure: bool,
    fail_start: bool,
    fail_focus: bool,
    lens_position: Mutex<Option<f32>>,
    recording: Mutex<bool>,
}

impl FakeSession {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

impl CameraSession for FakeSession {
    fn configure(&self, resolution: Resolution) -> Result<(), CameraError> {
        self.record(format!("configure {}", resolution));
        if self.fail_configure {
            return Err(CameraError::UnsupportedResolution {
                resolution,
                reason: "not-negotiated".to_string(),
            });
        }
        Ok(())
    }

    fn latest_frame(&self) -> Option<Arc<CameraFrame>> {
        None
    }

    fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, CaptureError> {
        self.record("capture");
        self.captures.lock().unwrap().push(request.clone());
        Ok(PathBuf::from(format!("/tmp/IMG_test.{}", request.format.extension())))
    }

    fn start_recording(&self) -> Result<PathBuf, RecordingError> {
        self.record("start");
        if self.fail_start {
            return Err(RecordingError::EncoderNotAvailable("none".to_string()));
        }
        *self.recording.lock().unwrap() = true;
        Ok(PathBuf::from("/tmp/VID_test.mp4"))
    }

    fn stop_recording(&self) -> Result<PathBuf, RecordingError> {
        self.record("stop");
        *self.recording.lock().unwrap() = false;
        Ok(PathBuf::from("/tmp/VID_test.mp4"))
    }

    fn set_focus_mode(&self, mode: FocusMode) -> Result<(), FocusError> {
        self.record(format!("focus-mode {}", mode));
        if self.fail_focus {
            return Err(FocusError::Unsupported("af-mode".to_string()));
        }
        Ok(())
    }

    fn trigger_autofocus(&self) -> Result<(), FocusError> {
        self.record("autofocus");
        Ok(())
    }

    fn set_lens_position(&self, position: f32) -> Result<(), FocusError> {
        self.record(format!("lens {:.2}", position));
        *self.lens_position.lock().unwrap() = Some(position);
        Ok(())
    }

    fn lens_position(&self) -> Option<f32> {
        *self.lens_position.lock().unwrap()
    }

    fn close(&self) -> Result<Option<PathBuf>, RecordingError> {
        self.record("close");
        let mut recording = self.recording.lock().unwrap();
        if std::mem::take(&mut *recording) {
            return Ok(Some(PathBuf::from("/tmp/VID_test.mp4")));
        }
        Ok(None)
    }
}

/// Session whose capture holds the pipeline lock until released, with
/// focus handled the way the libcamera session does it
struct SlowCaptureSession {
    pipeline: Mutex<()>,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
    focus: FocusControl,
}

impl CameraSession for SlowCaptureSession {
    fn configure(&self, _resolution: Resolution) -> Result<(), CameraError> {
        let _pipeline = self.pipeline.lock().unwrap();
        Ok(())
    }

    fn latest_frame(&self) -> Option<Arc<CameraFrame>> {
        None
    }

    fn capture(&self, _request: &CaptureRequest) -> Result<PathBuf, CaptureError> {
        let _pipeline = self.pipeline.lock().unwrap();
        if let Some(entered) = self.entered.lock().unwrap().take() {
            entered.send(()).unwrap();
        }
        self.release.lock().unwrap().recv().unwrap();
        Ok(PathBuf::from("/tmp/IMG_slow.jpg"))
    }

    fn start_recording(&self) -> Result<PathBuf, RecordingError> {
        let _pipeline = self.pipeline.lock().unwrap();
        Ok(PathBuf::from("/tmp/VID_slow.mp4"))
    }

    fn stop_recording(&self) -> Result<PathBuf, RecordingError> {
        let _pipeline = self.pipeline.lock().unwrap();
        Ok(PathBuf::from("/tmp/VID_slow.mp4"))
    }

    fn set_focus_mode(&self, mode: FocusMode) -> Result<(), FocusError> {
        self.focus.set_mode(mode)
    }

    fn trigger_autofocus(&self) -> Result<(), FocusError> {
        self.focus.trigger_autofocus()
    }

    fn set_lens_position(&self, position: f32) -> Result<(), FocusError> {
        self.focus.set_lens_position(position)
    }

    fn lens_position(&self) -> Option<f32> {
        self.focus.lens_position()
    }

    fn close(&self) -> Result<Option<PathBuf>, RecordingError> {
        Ok(None)
    }
}

#[test]
fn test_start_while_recording_sends_nothing() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    controls::apply(&mut state, &session, ControlEvent::StartRecording);
    let outcome = controls::apply(&mut state, &session, ControlEvent::StartRecording);

    assert!(state.is_recording);
    assert_eq!(session.count("start"), 1, "No duplicate start command");
    assert_eq!(outcome.feedback, None);
}

#[test]
fn test_stop_when_idle_sends_nothing() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    controls::apply(&mut state, &session, ControlEvent::StopRecording);

    assert!(session.calls().is_empty());
    assert!(!state.is_recording);
}

#[test]
fn test_toggle_recording_round_trip() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    let started = controls::apply(&mut state, &session, ControlEvent::ToggleRecording);
    assert!(state.is_recording);
    assert_eq!(
        started.feedback,
        Some(Feedback::RecordingStarted(PathBuf::from("/tmp/VID_test.mp4")))
    );

    let stopped = controls::apply(&mut state, &session, ControlEvent::ToggleRecording);
    assert!(!state.is_recording);
    assert_eq!(
        stopped.feedback,
        Some(Feedback::RecordingSaved(PathBuf::from("/tmp/VID_test.mp4")))
    );
    assert_eq!(session.calls(), vec!["start", "stop"]);
}

#[test]
fn test_failed_start_rolls_back_recording_flag() {
    let session = FakeSession {
        fail_start: true,
        ..FakeSession::default()
    };
    let mut state = ApplicationState::default();

    let outcome = controls::apply(&mut state, &session, ControlEvent::StartRecording);

    assert!(!state.is_recording);
    assert!(matches!(
        outcome.feedback,
        Some(Feedback::Error(AppError::Recording(
            RecordingError::EncoderNotAvailable(_)
        )))
    ));
}

#[test]
fn test_failed_resolution_change_keeps_previous_value() {
    let session = FakeSession {
        fail_configure: true,
        ..FakeSession::default()
    };
    let mut state = ApplicationState::default();
    let before = state.resolution;

    let outcome = controls::apply(
        &mut state,
        &session,
        ControlEvent::SelectResolution(Resolution::new(1920, 1080)),
    );

    assert_eq!(state.resolution, before);
    assert!(outcome.feedback.is_some_and(|f| f.is_error()));
    assert_eq!(session.calls(), vec!["configure 1920x1080"]);
}

#[test]
fn test_resolution_change_clears_crop() {
    let session = FakeSession::default();
    let mut state = ApplicationState {
        crop_rect: Some(Rectangle::new(10.0, 10.0, 50.0, 50.0)),
        ..ApplicationState::default()
    };

    controls::apply(
        &mut state,
        &session,
        ControlEvent::SelectResolution(Resolution::new(640, 480)),
    );

    assert_eq!(state.resolution, Resolution::new(640, 480));
    assert_eq!(state.crop_rect, None);
}

#[test]
fn test_same_resolution_is_not_reconfigured() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();
    let current = state.resolution;

    controls::apply(&mut state, &session, ControlEvent::SelectResolution(current));

    assert!(session.calls().is_empty());
}

#[test]
fn test_capture_request_carries_format_and_crop() {
    let session = FakeSession::default();
    let crop = Rectangle::new(10.0, 10.0, 100.0, 50.0);
    let mut state = ApplicationState {
        crop_rect: Some(crop),
        ..ApplicationState::default()
    };

    controls::apply(
        &mut state,
        &session,
        ControlEvent::SelectCaptureFormat(CaptureFormat::Tiff),
    );
    let outcome = controls::apply(&mut state, &session, ControlEvent::Capture);

    let captures = session.captures.lock().unwrap();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].format, CaptureFormat::Tiff);
    assert_eq!(captures[0].crop_rect, Some(crop));
    assert_eq!(captures[0].resolution, state.capture_resolution);
    assert_eq!(
        outcome.feedback,
        Some(Feedback::PhotoSaved(PathBuf::from("/tmp/IMG_test.tiff")))
    );
}

#[test]
fn test_autofocus_trigger_requires_one_shot_mode() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    let outcome = controls::apply(&mut state, &session, ControlEvent::TriggerAutofocus);
    assert_eq!(outcome.feedback, Some(Feedback::AutofocusNeedsOneShot));
    assert_eq!(session.count("autofocus"), 0);

    controls::apply(
        &mut state,
        &session,
        ControlEvent::SetFocusMode(FocusMode::AutoOneShot),
    );
    controls::apply(&mut state, &session, ControlEvent::TriggerAutofocus);
    assert_eq!(session.count("autofocus"), 1);
}

#[test]
fn test_manual_slider_streams_every_position() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    controls::apply(
        &mut state,
        &session,
        ControlEvent::SetFocusMode(FocusMode::Manual),
    );
    for position in [1.0, 2.5, 12.0] {
        controls::apply(&mut state, &session, ControlEvent::SetLensPosition(position));
    }

    assert_eq!(
        session.calls(),
        vec!["focus-mode manual", "lens 1.00", "lens 2.50", "lens 10.00"]
    );
    assert_eq!(state.manual_focus_position, 10.0);
}

#[test]
fn test_entering_manual_mode_seeds_slider_from_session() {
    let session = FakeSession::default();
    *session.lens_position.lock().unwrap() = Some(3.25);
    let mut state = ApplicationState::default();

    controls::apply(
        &mut state,
        &session,
        ControlEvent::SetFocusMode(FocusMode::Manual),
    );

    assert_eq!(state.manual_focus_position, 3.25);
}

#[test]
fn test_failed_focus_mode_rolls_back() {
    let session = FakeSession {
        fail_focus: true,
        ..FakeSession::default()
    };
    let mut state = ApplicationState::default();

    let outcome = controls::apply(
        &mut state,
        &session,
        ControlEvent::SetFocusMode(FocusMode::Manual),
    );

    assert_eq!(state.focus_mode, FocusMode::Continuous);
    assert!(outcome.feedback.is_some_and(|f| f.is_error()));
}

#[test]
fn test_four_rotations_restore_orientation() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();

    for _ in 0..4 {
        controls::apply(&mut state, &session, ControlEvent::RotateClockwise);
    }

    assert_eq!(state.rotation, Rotation::Deg0);
    assert!(session.calls().is_empty());
}

#[test]
fn test_theme_toggle_twice_restores_rendered_palette() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();
    let render = |state: &ApplicationState| {
        PreviewRenderer::render(None, state, &OverlayState::default(), &Magnifier::default())
    };
    let palette_before = Palette::for_theme(state.theme);
    let pixel_before = *render(&state).get_pixel(5, 5);

    let first = controls::apply(&mut state, &session, ControlEvent::ToggleTheme);
    assert_eq!(state.theme, Theme::Light);
    assert!(first.repaint);
    assert_ne!(Palette::for_theme(state.theme), palette_before);
    assert_ne!(*render(&state).get_pixel(5, 5), pixel_before);

    controls::apply(&mut state, &session, ControlEvent::ToggleTheme);
    assert_eq!(state.theme, Theme::Dark);
    assert_eq!(Palette::for_theme(state.theme), palette_before);
    assert_eq!(*render(&state).get_pixel(5, 5), pixel_before);
}

#[test]
fn test_overlapping_resolution_changes_follow_the_last_success() {
    let mut state = ApplicationState::default();
    let first = controls::dispatch(
        &mut state,
        ControlEvent::SelectResolution(Resolution::new(1920, 1080)),
    )
    .command
    .unwrap();
    let second = controls::dispatch(
        &mut state,
        ControlEvent::SelectResolution(Resolution::new(640, 480)),
    )
    .command
    .unwrap();

    controls::complete(&mut state, &first, Err(AppError::Camera(CameraError::Busy)));
    assert_eq!(state.resolution, Resolution::new(640, 480));

    controls::complete(&mut state, &second, Ok(CommandOutput::Applied));
    assert_eq!(state.resolution, Resolution::new(640, 480));
}

#[test]
fn test_success_after_newer_failure_matches_camera() {
    let mut state = ApplicationState::default();
    let first = controls::dispatch(
        &mut state,
        ControlEvent::SelectResolution(Resolution::new(1920, 1080)),
    )
    .command
    .unwrap();
    let second = controls::dispatch(
        &mut state,
        ControlEvent::SelectResolution(Resolution::new(640, 480)),
    )
    .command
    .unwrap();

    controls::complete(&mut state, &first, Ok(CommandOutput::Applied));
    controls::complete(&mut state, &second, Err(AppError::Camera(CameraError::Busy)));

    assert_eq!(state.resolution, Resolution::new(1920, 1080));
}

#[test]
fn test_focus_writes_do_not_wait_for_capture() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let session = Arc::new(SlowCaptureSession {
        pipeline: Mutex::new(()),
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
        focus: FocusControl::new(FocusSettings::new(FocusMode::Continuous, None)),
    });

    let worker_session = Arc::clone(&session);
    let request = ApplicationState::default().capture_request();
    let capture = thread::spawn(move || {
        controls::execute(worker_session.as_ref(), &SessionCommand::Capture(request))
    });
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // Capture is now parked holding the pipeline lock
    let (done_tx, done_rx) = mpsc::channel();
    let ui_session = Arc::clone(&session);
    thread::spawn(move || {
        let mut state = ApplicationState::default();
        controls::apply(
            &mut state,
            ui_session.as_ref(),
            ControlEvent::SetFocusMode(FocusMode::Manual),
        );
        controls::apply(&mut state, ui_session.as_ref(), ControlEvent::SetLensPosition(2.0));
        controls::apply(&mut state, ui_session.as_ref(), ControlEvent::SetLensPosition(3.5));
        done_tx.send(state).unwrap();
    });

    let state = done_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("focus commands blocked behind the capture");
    assert_eq!(state.focus_mode, FocusMode::Manual);
    assert_eq!(session.lens_position(), Some(3.5));

    release_tx.send(()).unwrap();
    let saved = capture.join().unwrap();
    assert_eq!(
        saved,
        Ok(CommandOutput::Saved(PathBuf::from("/tmp/IMG_slow.jpg")))
    );
}

#[test]
fn test_shutdown_finalizes_open_recording() {
    let session = FakeSession::default();
    let mut state = ApplicationState::default();
    controls::apply(&mut state, &session, ControlEvent::StartRecording);

    let feedback = controls::shutdown(&session);

    assert_eq!(
        feedback,
        Some(Feedback::RecordingSaved(PathBuf::from("/tmp/VID_test.mp4")))
    );
    assert_eq!(session.calls(), vec!["start", "close"]);
}

#[test]
fn test_shutdown_when_idle_reports_nothing() {
    let session = FakeSession::default();
    assert_eq!(controls::shutdown(&session), None);
    assert_eq!(session.calls(), vec!["close"]);
}

#[test]
fn test_blocking_commands_are_split_from_dispatch() {
    let mut state = ApplicationState::default();
    let outcome = controls::dispatch(&mut state, ControlEvent::StartRecording);

    assert_eq!(outcome.command, Some(SessionCommand::StartRecording));
    assert!(outcome.command.as_ref().is_some_and(|c| c.is_blocking()));
    assert!(state.is_recording, "State updates before the session answers");
}
