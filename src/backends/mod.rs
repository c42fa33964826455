// SPDX-License-Identifier: GPL-3.0-only

//! Hardware access
//!
//! - [`camera`]: camera session trait and the libcamera implementation

pub mod camera;
