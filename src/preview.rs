// SPDX-License-Identifier: GPL-3.0-only

//! Preview rendering
//!
//! Turns the latest camera frame into the image shown in the window:
//! rotated, letterboxed into the preview surface, with the crop outline
//! and magnifier window composited on top.

use crate::backends::camera::CameraFrame;
use crate::constants::{magnifier as magnifier_consts, preview};
use crate::geometry::{Rectangle, Size};
use crate::model::{ApplicationState, Theme};
use crate::overlay::{Magnifier, OverlayState, magnifier};
use image::{Rgba, RgbaImage, imageops};
use tracing::trace;

/// Colours used for everything the renderer draws itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Placeholder and letterbox fill
    pub background: Rgba<u8>,
    /// Outline of an applied crop
    pub crop_outline: Rgba<u8>,
    /// Outline of the rectangle being dragged
    pub live_outline: Rgba<u8>,
    pub magnifier_border: Rgba<u8>,
    /// Blinking dot shown while recording
    pub record_indicator: Rgba<u8>,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Rgba([24, 24, 24, 255]),
                crop_outline: Rgba([255, 196, 0, 255]),
                live_outline: Rgba([0, 200, 255, 255]),
                magnifier_border: Rgba([230, 230, 230, 255]),
                record_indicator: Rgba([235, 40, 40, 255]),
            },
            Theme::Light => Self {
                background: Rgba([232, 232, 232, 255]),
                crop_outline: Rgba([214, 64, 0, 255]),
                live_outline: Rgba([0, 110, 210, 255]),
                magnifier_border: Rgba([40, 40, 40, 255]),
                record_indicator: Rgba([200, 0, 0, 255]),
            },
        }
    }
}

/// Composes preview images
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewRenderer;

impl PreviewRenderer {
    /// Render one preview image at the surface size in `state`
    ///
    /// Without a frame the result is a placeholder filled with the palette
    /// background; the crop outline is still drawn.
    pub fn render(
        frame: Option<&CameraFrame>,
        state: &ApplicationState,
        overlay: &OverlayState,
        magnifier: &Magnifier,
    ) -> RgbaImage {
        let palette = Palette::for_theme(state.theme);
        let bounds = state.preview_size;
        let (width, height) = surface_pixels(bounds);
        let mut canvas = RgbaImage::from_pixel(width, height, palette.background);

        let content = frame.and_then(|frame| {
            let image = frame.to_rgba_image()?;
            let rotated = magnifier::rotate(&image, state.rotation);
            let content = Rectangle::fit(rotated.width(), rotated.height(), bounds);
            let scaled = imageops::resize(
                &rotated,
                (content.w.round() as u32).max(1),
                (content.h.round() as u32).max(1),
                imageops::FilterType::Triangle,
            );
            imageops::replace(
                &mut canvas,
                &scaled,
                content.x.round() as i64,
                content.y.round() as i64,
            );
            Some(content)
        });

        if let Some(crop) = state.crop_rect {
            let color = if overlay.crop.is_dragging() {
                palette.live_outline
            } else {
                palette.crop_outline
            };
            draw_outline(&mut canvas, &crop, preview::OUTLINE_WIDTH, color);
        }

        if let (Some(frame), Some(content), Some(pointer)) = (
            frame,
            content,
            overlay.magnifier_pointer(state.magnifier_enabled),
        ) && let Some(layout) = magnifier.layout(pointer, bounds, content)
            && let Some(zoomed) = magnifier.render(frame, &layout, bounds, state.rotation)
        {
            imageops::replace(
                &mut canvas,
                &zoomed,
                layout.window.x.round() as i64,
                layout.window.y.round() as i64,
            );
            draw_outline(
                &mut canvas,
                &layout.window,
                magnifier_consts::BORDER_WIDTH,
                palette.magnifier_border,
            );
        }

        if overlay.record_indicator_visible(state.is_recording) {
            let origin = content.unwrap_or(Rectangle::new(0.0, 0.0, bounds.width, bounds.height));
            let inset = preview::RECORD_INDICATOR_INSET as f32;
            draw_dot(
                &mut canvas,
                origin.x + inset,
                origin.y + inset,
                preview::RECORD_INDICATOR_RADIUS,
                palette.record_indicator,
            );
        }

        trace!(width, height, has_frame = content.is_some(), "Preview rendered");
        canvas
    }
}

fn surface_pixels(bounds: Size) -> (u32, u32) {
    (
        bounds.width.round().max(1.0) as u32,
        bounds.height.round().max(1.0) as u32,
    )
}

/// Draw a rectangle outline of `thickness` pixels inside `rect`
fn draw_outline(canvas: &mut RgbaImage, rect: &Rectangle, thickness: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let left = (rect.x.round().max(0.0) as u32).min(width);
    let top = (rect.y.round().max(0.0) as u32).min(height);
    let right = (rect.right().round().max(0.0) as u32).min(width);
    let bottom = (rect.bottom().round().max(0.0) as u32).min(height);
    if left >= right || top >= bottom {
        return;
    }

    for y in top..bottom {
        for x in left..right {
            let on_edge = x < left + thickness
                || x + thickness >= right
                || y < top + thickness
                || y + thickness >= bottom;
            if on_edge {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Fill a disc of `radius` pixels centred on (`cx`, `cy`)
fn draw_dot(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let r = radius as f32;
    let left = (cx - r).floor().max(0.0) as u32;
    let top = (cy - r).floor().max(0.0) as u32;
    let right = ((cx + r).ceil().max(0.0) as u32).min(width);
    let bottom = ((cy + r).ceil().max(0.0) as u32).min(height);

    for y in top..bottom {
        for x in left..right {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rotation};

    fn state(width: f32, height: f32) -> ApplicationState {
        ApplicationState {
            preview_size: Size::new(width, height),
            ..ApplicationState::default()
        }
    }

    #[test]
    fn test_placeholder_uses_theme_background() {
        let mut app = state(40.0, 30.0);
        app.theme = Theme::Light;
        let image = PreviewRenderer::render(None, &app, &OverlayState::default(), &Magnifier::default());
        assert_eq!(image.dimensions(), (40, 30));
        assert_eq!(*image.get_pixel(20, 15), Palette::for_theme(Theme::Light).background);
    }

    #[test]
    fn test_frame_is_letterboxed() {
        let app = state(40.0, 40.0);
        let frame = CameraFrame::from_rgba_image(&RgbaImage::from_pixel(
            20,
            10,
            Rgba([255, 0, 0, 255]),
        ));
        let image =
            PreviewRenderer::render(Some(&frame), &app, &OverlayState::default(), &Magnifier::default());
        let background = Palette::for_theme(app.theme).background;
        assert_eq!(*image.get_pixel(20, 2), background);
        assert_eq!(image.get_pixel(20, 20).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_quarter_turn_fills_tall_surface() {
        let mut app = state(10.0, 20.0);
        app.rotation = Rotation::Deg90;
        let frame = CameraFrame::from_rgba_image(&RgbaImage::from_pixel(
            20,
            10,
            Rgba([0, 255, 0, 255]),
        ));
        let image =
            PreviewRenderer::render(Some(&frame), &app, &OverlayState::default(), &Magnifier::default());
        assert_eq!(image.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(image.get_pixel(9, 19).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_crop_outline_drawn() {
        let mut app = state(50.0, 50.0);
        app.crop_rect = Some(Rectangle::new(10.0, 10.0, 20.0, 20.0));
        let image = PreviewRenderer::render(None, &app, &OverlayState::default(), &Magnifier::default());
        let palette = Palette::for_theme(app.theme);
        assert_eq!(*image.get_pixel(10, 15), palette.crop_outline);
        assert_eq!(*image.get_pixel(20, 20), palette.background);
    }

    #[test]
    fn test_recording_dot_follows_blink_phase() {
        let mut app = state(100.0, 100.0);
        app.is_recording = true;
        let palette = Palette::for_theme(app.theme);
        let centre = preview::RECORD_INDICATOR_INSET;

        let lit = OverlayState {
            record_blink_on: true,
            ..OverlayState::default()
        };
        let image = PreviewRenderer::render(None, &app, &lit, &Magnifier::default());
        assert_eq!(*image.get_pixel(centre, centre), palette.record_indicator);

        let dark = OverlayState::default();
        let image = PreviewRenderer::render(None, &app, &dark, &Magnifier::default());
        assert_eq!(*image.get_pixel(centre, centre), palette.background);

        app.is_recording = false;
        let image = PreviewRenderer::render(None, &app, &lit, &Magnifier::default());
        assert_eq!(*image.get_pixel(centre, centre), palette.background);
    }

    #[test]
    fn test_recording_dot_sits_inside_letterboxed_frame() {
        let mut app = state(40.0, 80.0);
        app.is_recording = true;
        let frame = CameraFrame::from_rgba_image(&RgbaImage::from_pixel(
            40,
            40,
            Rgba([0, 0, 255, 255]),
        ));
        let overlay = OverlayState {
            record_blink_on: true,
            ..OverlayState::default()
        };
        let image = PreviewRenderer::render(Some(&frame), &app, &overlay, &Magnifier::default());
        let palette = Palette::for_theme(app.theme);
        // Frame occupies rows 20..60
        assert_eq!(*image.get_pixel(18, 38), palette.record_indicator);
        assert_eq!(image.get_pixel(18, 18).0, palette.background.0);
    }

    #[test]
    fn test_magnifier_hidden_when_disabled() {
        let app = state(300.0, 300.0);
        let frame = CameraFrame::from_rgba_image(&RgbaImage::from_pixel(
            300,
            300,
            Rgba([9, 9, 9, 255]),
        ));
        let overlay = OverlayState {
            pointer: Some(Point::new(50.0, 50.0)),
            ..OverlayState::default()
        };
        let image = PreviewRenderer::render(Some(&frame), &app, &overlay, &Magnifier::default());
        // Window border would sit at pointer + offset
        assert_eq!(image.get_pixel(70, 70).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_magnifier_border_drawn_when_enabled() {
        let mut app = state(300.0, 300.0);
        app.magnifier_enabled = true;
        let frame = CameraFrame::from_rgba_image(&RgbaImage::from_pixel(
            300,
            300,
            Rgba([9, 9, 9, 255]),
        ));
        let overlay = OverlayState {
            pointer: Some(Point::new(50.0, 50.0)),
            ..OverlayState::default()
        };
        let image = PreviewRenderer::render(Some(&frame), &app, &overlay, &Magnifier::default());
        assert_eq!(*image.get_pixel(70, 70), Palette::for_theme(app.theme).magnifier_border);
    }
}
