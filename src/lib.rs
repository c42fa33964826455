// SPDX-License-Identifier: GPL-3.0-only

//! picam - A camera application for the Raspberry Pi camera modules
//!
//! Live preview, still capture, H.264 recording and focus control on top
//! of libcamera, wrapped in a libcosmic window.
//!
//! # Architecture
//!
//! - [`app`]: libcosmic application, messages and view
//! - [`controls`]: control events, session commands and their effects on state
//! - [`model`]: application state and the closed value types it holds
//! - [`overlay`]: crop rectangle and magnifier
//! - [`preview`]: renders frames and overlays into the displayed image
//! - [`backends`]: camera session trait and the libcamera implementation
//! - [`pipelines`]: still and video pipelines
//! - [`config`]: start-up defaults
//! - [`storage`]: output directories and file naming

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod controls;
pub mod errors;
pub mod geometry;
pub mod i18n;
pub mod model;
pub mod overlay;
pub mod pipelines;
pub mod preview;
pub mod storage;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use backends::camera::CameraSession;
pub use config::Config;
pub use model::ApplicationState;
