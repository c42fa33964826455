// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Preview surface on the left, control column on the right, status line
//! underneath.

use crate::app::state::{AppModel, Message};
use crate::constants::{CAPTURE_RESOLUTIONS, PREVIEW_RESOLUTIONS, focus};
use crate::controls::ControlEvent;
use crate::fl;
use crate::geometry::Point;
use crate::model::{CaptureFormat, FocusMode, Theme};
use cosmic::Element;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

/// Width of the control column
const CONTROL_COLUMN_WIDTH: f32 = 280.0;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let body = widget::row()
            .push(self.build_preview())
            .push(
                widget::scrollable(self.build_control_column())
                    .width(Length::Fixed(CONTROL_COLUMN_WIDTH)),
            )
            .spacing(spacing.space_m);

        widget::column()
            .push(body)
            .push(self.build_status_line())
            .spacing(spacing.space_s)
            .padding(spacing.space_s)
            .into()
    }

    /// Rendered preview inside a pointer-tracking area
    fn build_preview(&self) -> Element<'_, Message> {
        let size = self.state.preview_size;
        let image = widget::image(self.preview_handle.clone())
            .width(Length::Fixed(size.width))
            .height(Length::Fixed(size.height));

        widget::mouse_area(image)
            .on_press(Message::PointerPressed)
            .on_release(Message::PointerReleased)
            .on_move(|point: cosmic::iced::Point| {
                Message::PointerMoved(Point::new(point.x, point.y))
            })
            .on_exit(Message::PointerLeft)
            .into()
    }

    fn build_control_column(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();
        let idle = !self.is_busy();

        let resolution_index = PREVIEW_RESOLUTIONS
            .iter()
            .position(|r| *r == self.state.resolution);
        let capture_resolution_index = CAPTURE_RESOLUTIONS
            .iter()
            .position(|r| *r == self.state.capture_resolution);
        let format_index = CaptureFormat::ALL
            .iter()
            .position(|f| *f == self.state.capture_format);
        let focus_index = FocusMode::ALL
            .iter()
            .position(|m| *m == self.state.focus_mode);

        let record_label = if self.state.is_recording {
            fl!("record-stop")
        } else {
            fl!("record-start")
        };
        let pause_label = if self.state.preview_paused {
            fl!("preview-resume")
        } else {
            fl!("preview-pause")
        };
        let theme_label = match self.state.theme {
            Theme::Dark => fl!("theme-light"),
            Theme::Light => fl!("theme-dark"),
        };

        // The stream restarts on every change; one at a time
        let resolution_picker: Element<'_, Message> = if idle {
            widget::dropdown(
                &self.resolution_options,
                resolution_index,
                Message::SelectResolution,
            )
            .into()
        } else {
            control_button(self.state.resolution.to_string(), None)
        };

        let mut column = widget::column()
            .push(section_title(fl!("preview-resolution")))
            .push(resolution_picker)
            .push(section_title(fl!("capture-resolution")))
            .push(widget::dropdown(
                &self.capture_resolution_options,
                capture_resolution_index,
                Message::SelectCaptureResolution,
            ))
            .push(section_title(fl!("capture-format")))
            .push(widget::dropdown(
                &self.format_options,
                format_index,
                Message::SelectCaptureFormat,
            ))
            .push(
                widget::row()
                    .push(control_button(
                        fl!("capture"),
                        (idle && !self.state.is_recording)
                            .then_some(Message::Control(ControlEvent::Capture)),
                    ))
                    .push(control_button(
                        record_label,
                        idle.then_some(Message::Control(ControlEvent::ToggleRecording)),
                    ))
                    .spacing(spacing.space_xs),
            )
            .push(section_title(fl!("focus-mode")))
            .push(widget::dropdown(
                &self.focus_mode_options,
                focus_index,
                Message::SelectFocusMode,
            ));

        match self.state.focus_mode {
            FocusMode::AutoOneShot => {
                column = column.push(control_button(
                    fl!("focus-trigger"),
                    Some(Message::Control(ControlEvent::TriggerAutofocus)),
                ));
            }
            FocusMode::Manual => {
                column = column
                    .push(
                        widget::slider(
                            0.0..=focus::LENS_POSITION_MAX,
                            self.state.manual_focus_position,
                            Message::SetLensPosition,
                        )
                        .step(focus::SLIDER_STEP),
                    )
                    .push(widget::text::body(self.focus_distance_label()));
            }
            FocusMode::Continuous => {}
        }

        column
            .push(section_title(fl!("view")))
            .push(
                widget::row()
                    .push(control_button(
                        fl!("rotate-counter-clockwise"),
                        Some(Message::Control(ControlEvent::RotateCounterClockwise)),
                    ))
                    .push(control_button(
                        fl!("rotate-clockwise"),
                        Some(Message::Control(ControlEvent::RotateClockwise)),
                    ))
                    .spacing(spacing.space_xs),
            )
            .push(
                widget::row()
                    .push(control_button(
                        pause_label,
                        Some(Message::Control(ControlEvent::TogglePreviewPause)),
                    ))
                    .push(control_button(
                        fl!("clear-crop"),
                        self.state
                            .crop_rect
                            .is_some()
                            .then_some(Message::Control(ControlEvent::ClearCrop)),
                    ))
                    .spacing(spacing.space_xs),
            )
            .push(control_button(
                theme_label,
                Some(Message::Control(ControlEvent::ToggleTheme)),
            ))
            .push(
                widget::row()
                    .push(widget::text::body(fl!("magnifier")).width(Length::Fill))
                    .push(
                        widget::toggler(self.state.magnifier_enabled)
                            .on_toggle(|_| Message::Control(ControlEvent::ToggleMagnifier)),
                    )
                    .align_y(Alignment::Center),
            )
            .spacing(spacing.space_xs)
            .into()
    }

    fn build_status_line(&self) -> Element<'_, Message> {
        let text = match (&self.notification, self.is_busy()) {
            (Some(notification), _) => notification.text.clone(),
            (None, true) => fl!("working"),
            (None, false) => String::new(),
        };
        let is_error = self
            .notification
            .as_ref()
            .is_some_and(|notification| notification.is_error);

        if is_error {
            widget::text::heading(text).into()
        } else {
            widget::text::body(text).into()
        }
    }
}

fn section_title<'a>(label: String) -> Element<'a, Message> {
    widget::text::heading(label).into()
}

/// Standard button, disabled when `message` is `None`
fn control_button<'a>(label: String, message: Option<Message>) -> Element<'a, Message> {
    let button = widget::button::standard(label);
    match message {
        Some(message) => button.on_press(message).into(),
        None => button.into(),
    }
}
