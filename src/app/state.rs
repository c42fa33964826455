// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::{CameraFrame, CameraSession};
use crate::config::Config;
use crate::controls::{CommandOutput, ControlEvent, SessionCommand};
use crate::errors::AppResult;
use crate::geometry::Point;
use crate::model::ApplicationState;
use crate::overlay::{Magnifier, OverlayState};
use cosmic::widget::about::About;
use cosmic::widget::image::Handle;
use std::sync::Arc;
use std::time::Instant;

/// Data handed from `main` to the application at start-up
#[derive(Clone)]
pub struct Flags {
    pub config: Config,
    pub session: Arc<dyn CameraSession>,
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flags")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Transient message on the status line
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Identifies the notification for its expiry timer
    pub id: u64,
    pub text: String,
    pub is_error: bool,
}

/// The application model
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    pub about: About,
    pub config: Config,
    /// The camera; owns the pipelines and the frame slot
    pub session: Arc<dyn CameraSession>,
    /// Resolution, crop, rotation, focus and the other user-facing settings
    pub state: ApplicationState,
    pub overlay: OverlayState,
    pub magnifier: Magnifier,
    /// Frame the preview was last rendered from; kept while paused
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Rendered preview image
    pub preview_handle: Handle,
    pub notification: Option<Notification>,
    /// Counter for notification ids
    pub notification_seq: u64,
    /// Blocking session commands still running
    pub pending_commands: usize,
    /// Phase reference for the recording indicator blink
    pub blink_epoch: Instant,

    // Dropdown labels, built once
    pub resolution_options: Vec<String>,
    pub capture_resolution_options: Vec<String>,
    pub format_options: Vec<String>,
    pub focus_mode_options: Vec<String>,
}

impl AppModel {
    /// True while a capture, record or reconfigure is in flight
    pub fn is_busy(&self) -> bool {
        self.pending_commands > 0
    }
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page
    ToggleContextPage(ContextPage),

    // ===== Preview =====
    /// Preview refresh timer
    Tick,
    /// Pointer moved over the preview (preview coordinates)
    PointerMoved(Point),
    PointerPressed,
    PointerReleased,
    /// Pointer left the preview
    PointerLeft,

    // ===== Controls =====
    /// Button, toggle and slider actions
    Control(ControlEvent),
    /// Preview resolution dropdown index
    SelectResolution(usize),
    /// Capture resolution dropdown index
    SelectCaptureResolution(usize),
    /// Capture format dropdown index
    SelectCaptureFormat(usize),
    /// Focus mode dropdown index
    SelectFocusMode(usize),
    /// Manual focus slider value in dioptres
    SetLensPosition(f32),

    // ===== Session =====
    /// A session command ran to completion
    CommandFinished(SessionCommand, AppResult<CommandOutput>),

    // ===== Notifications =====
    /// Expire the notification with this id
    ClearNotification(u64),
}
