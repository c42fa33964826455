// SPDX-License-Identifier: GPL-3.0-only

//! Capture and recording pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │ libcamerasrc │ ──▶ │  Photo Pipeline   │ ──▶ │ JPEG/PNG/TIFF/DNG│
//! │ (still size) │     │  - Crop           │     │                  │
//! │              │     │  - Encoding       │     │                  │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ libcamerasrc │ ──▶ │  Video Pipeline   │ ──▶ │   MP4 File   │
//! │(preview size)│     │  - H.264 encoder  │     │              │
//! │              │     │  - Preview tee    │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`photo`]: still capture, crop and encoding
//! - [`video`]: H.264 recording with hardware encoder preference

pub mod photo;
pub mod video;
