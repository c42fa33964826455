// SPDX-License-Identifier: GPL-3.0-only

//! Focus controls exposed as libcamerasrc properties
//!
//! libcamerasrc maps libcamera controls onto GObject properties
//! (`af-mode`, `af-trigger`, `lens-position`). Older builds lack them, so
//! every write checks the property first and reports
//! [`FocusError::Unsupported`] instead of panicking inside glib.

use crate::errors::FocusError;
use crate::model::FocusMode;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const AF_MODE: &str = "af-mode";
const AF_TRIGGER: &str = "af-trigger";
const LENS_POSITION: &str = "lens-position";

/// libcamera autofocus mode nick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfMode {
    /// Autofocus disabled, lens driven by LensPosition
    Manual,
    /// Single scan on trigger
    Auto,
    /// Continuous autofocus
    Continuous,
}

impl AfMode {
    fn nick(self) -> &'static str {
        match self {
            AfMode::Manual => "manual",
            AfMode::Auto => "auto",
            AfMode::Continuous => "continuous",
        }
    }
}

impl From<FocusMode> for AfMode {
    fn from(mode: FocusMode) -> Self {
        match mode {
            FocusMode::AutoOneShot => AfMode::Auto,
            FocusMode::Continuous => AfMode::Continuous,
            FocusMode::Manual => AfMode::Manual,
        }
    }
}

/// Focus state the session re-applies whenever it builds a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSettings {
    pub mode: FocusMode,
    /// Last requested lens position in dioptres
    pub lens_position: Option<f32>,
}

impl FocusSettings {
    pub fn new(mode: FocusMode, lens_position: Option<f32>) -> Self {
        Self {
            mode,
            lens_position,
        }
    }
}

/// Focus settings plus the camera source they are written to
///
/// Kept apart from the pipeline lock: a still capture or an EOS wait holds
/// that lock for seconds, while focus writes come straight from the UI
/// thread. Without a source the request is only stored, and
/// [`FocusControl::attach`] replays it onto the next pipeline. Lock order
/// is always `settings` then `source`.
#[derive(Debug)]
pub struct FocusControl {
    settings: Mutex<FocusSettings>,
    source: Mutex<Option<gst::Element>>,
}

impl FocusControl {
    pub fn new(settings: FocusSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            source: Mutex::new(None),
        }
    }

    fn settings_guard(&self) -> MutexGuard<'_, FocusSettings> {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn source_guard(&self) -> MutexGuard<'_, Option<gst::Element>> {
        self.source
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot used when building a pipeline
    pub fn settings(&self) -> FocusSettings {
        *self.settings_guard()
    }

    pub fn lens_position(&self) -> Option<f32> {
        self.settings_guard().lens_position
    }

    /// Route writes to `source` and replay the stored settings onto it
    ///
    /// `None` detaches while the sensor is between pipelines.
    pub fn attach(&self, source: Option<gst::Element>) {
        let settings = self.settings_guard();
        let mut slot = self.source_guard();
        if let Some(source) = &source
            && let Err(e) = apply_focus(source, &settings)
        {
            warn!(error = %e, "Failed to replay focus settings");
        }
        *slot = source;
    }

    pub fn set_mode(&self, mode: FocusMode) -> Result<(), FocusError> {
        let mut settings = self.settings_guard();
        let previous = settings.mode;
        settings.mode = mode;
        let result = match self.source_guard().as_ref() {
            Some(source) => apply_focus(source, &settings),
            None => {
                debug!(%mode, "No camera source, focus mode stored");
                Ok(())
            }
        };
        if result.is_err() {
            settings.mode = previous;
        }
        result
    }

    pub fn set_lens_position(&self, position: f32) -> Result<(), FocusError> {
        let mut settings = self.settings_guard();
        settings.lens_position = Some(position);
        match self.source_guard().as_ref() {
            Some(source) => set_lens_position(source, position),
            None => {
                debug!(position, "No camera source, lens position stored");
                Ok(())
            }
        }
    }

    pub fn trigger_autofocus(&self) -> Result<(), FocusError> {
        let source = self.source_guard().clone().ok_or(FocusError::NoActivePipeline)?;
        trigger_autofocus(&source)
    }
}

/// Push mode (and, in manual mode, lens position) to a camera source
pub fn apply_focus(source: &gst::Element, settings: &FocusSettings) -> Result<(), FocusError> {
    set_af_mode(source, settings.mode.into())?;
    if settings.mode == FocusMode::Manual
        && let Some(position) = settings.lens_position
    {
        set_lens_position(source, position)?;
    }
    Ok(())
}

pub fn set_af_mode(source: &gst::Element, mode: AfMode) -> Result<(), FocusError> {
    info!(mode = mode.nick(), "Setting autofocus mode");
    set_from_str(source, AF_MODE, mode.nick())
}

/// Start one autofocus scan
pub fn trigger_autofocus(source: &gst::Element) -> Result<(), FocusError> {
    debug!("Triggering autofocus scan");
    set_from_str(source, AF_TRIGGER, "start")
}

pub fn set_lens_position(source: &gst::Element, position: f32) -> Result<(), FocusError> {
    let pspec = source
        .find_property(LENS_POSITION)
        .ok_or_else(|| FocusError::Unsupported(LENS_POSITION.to_string()))?;

    let value = if pspec.value_type() == glib::Type::F32 {
        position.to_value()
    } else if pspec.value_type() == glib::Type::F64 {
        (position as f64).to_value()
    } else {
        return Err(FocusError::CommandFailed(format!(
            "{} has unexpected type {}",
            LENS_POSITION,
            pspec.value_type()
        )));
    };
    debug!(position, "Setting lens position");
    source.set_property_from_value(LENS_POSITION, &value);
    Ok(())
}

/// Set an enum property from its nick after validating it
fn set_from_str(source: &gst::Element, name: &str, value: &str) -> Result<(), FocusError> {
    let pspec = source
        .find_property(name)
        .ok_or_else(|| FocusError::Unsupported(name.to_string()))?;
    let parsed = glib::Value::deserialize(value, pspec.value_type())
        .map_err(|e| FocusError::CommandFailed(format!("{}={}: {}", name, value, e)))?;
    source.set_property_from_value(name, &parsed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_without_source_are_stored() {
        let control = FocusControl::new(FocusSettings::new(FocusMode::Continuous, None));

        control.set_mode(FocusMode::Manual).unwrap();
        control.set_lens_position(4.5).unwrap();

        assert_eq!(
            control.settings(),
            FocusSettings::new(FocusMode::Manual, Some(4.5))
        );
        assert_eq!(control.lens_position(), Some(4.5));
    }

    #[test]
    fn test_trigger_needs_a_source() {
        let control = FocusControl::new(FocusSettings::new(FocusMode::AutoOneShot, None));
        assert_eq!(control.trigger_autofocus(), Err(FocusError::NoActivePipeline));
    }

    #[test]
    fn test_focus_modes_map_to_libcamera_nicks() {
        assert_eq!(AfMode::from(FocusMode::AutoOneShot).nick(), "auto");
        assert_eq!(AfMode::from(FocusMode::Continuous).nick(), "continuous");
        assert_eq!(AfMode::from(FocusMode::Manual).nick(), "manual");
    }
}
