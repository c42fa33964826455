// SPDX-License-Identifier: GPL-3.0-only

//! Main application module
//!
//! # Architecture
//!
//! - `state`: AppModel, Message and start-up Flags
//! - `update`: Message dispatcher
//! - `handlers`: Message handlers grouped by concern
//! - `view`: Preview surface and control column
//!
//! State changes go through [`crate::controls`]; this module only turns
//! messages into control events and runs the resulting session commands.

mod handlers;
mod state;
mod update;
mod view;

use crate::constants::{CAPTURE_RESOLUTIONS, PREVIEW_RESOLUTIONS, timing};
use crate::fl;
use crate::model::{ApplicationState, CaptureFormat, FocusMode};
use crate::overlay::{Magnifier, OverlayState};
use cosmic::app::context_drawer;
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Flags, Message, Notification};
use tracing::info;

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = Flags;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.picam.Picam";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .version(env!("GIT_VERSION"))
            .license(env!("CARGO_PKG_LICENSE"));

        let Flags { config, session } = flags;
        let state = ApplicationState::from_config(&config);
        let magnifier = Magnifier::with_zoom(config.magnifier_zoom());

        let resolution_options = PREVIEW_RESOLUTIONS.iter().map(|r| r.to_string()).collect();
        let capture_resolution_options =
            CAPTURE_RESOLUTIONS.iter().map(|r| r.to_string()).collect();
        let format_options = CaptureFormat::ALL
            .iter()
            .map(|format| format_label(*format))
            .collect();
        let focus_mode_options = FocusMode::ALL
            .iter()
            .map(|mode| focus_mode_label(*mode))
            .collect();

        info!(
            resolution = %state.resolution,
            capture_resolution = %state.capture_resolution,
            theme = ?state.theme,
            "Application initialized"
        );

        let theme = state.theme;
        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            session,
            state,
            overlay: OverlayState::default(),
            magnifier,
            current_frame: None,
            preview_handle: widget::image::Handle::from_rgba(1, 1, vec![0, 0, 0, 255]),
            notification: None,
            notification_seq: 0,
            pending_commands: 0,
            blink_epoch: std::time::Instant::now(),
            resolution_options,
            capture_resolution_options,
            format_options,
            focus_mode_options,
        };
        app.render_preview();

        (app, cosmic::command::set_theme(theme.cosmic_theme()))
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("help-about-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::About))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    ///
    /// Frames land in the session's latest-frame slot from GStreamer
    /// threads; the timer pulls whatever is newest.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::SinkExt;

        Subscription::run_with_id(
            "preview_tick",
            cosmic::iced::stream::channel(1, |mut output| async move {
                info!(interval_ms = timing::PREVIEW_TICK_MS, "Preview timer started");
                let mut interval = tokio::time::interval(std::time::Duration::from_millis(
                    timing::PREVIEW_TICK_MS,
                ));
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    if output.send(Message::Tick).await.is_err() {
                        break;
                    }
                }
            }),
        )
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}

/// Dropdown label for a capture format
pub(crate) fn format_label(format: CaptureFormat) -> String {
    match format {
        CaptureFormat::Jpeg => fl!("format-jpeg"),
        CaptureFormat::Png => fl!("format-png"),
        CaptureFormat::Tiff => fl!("format-tiff"),
        CaptureFormat::Raw => fl!("format-raw"),
    }
}

/// Dropdown label for a focus mode
pub(crate) fn focus_mode_label(mode: FocusMode) -> String {
    match mode {
        FocusMode::AutoOneShot => fl!("focus-auto-one-shot"),
        FocusMode::Continuous => fl!("focus-continuous"),
        FocusMode::Manual => fl!("focus-manual"),
    }
}
