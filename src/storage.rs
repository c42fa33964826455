// SPDX-License-Identifier: GPL-3.0-only

//! Storage locations and file naming for captures and recordings

use crate::config::Config;
use crate::constants::files;
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory stills are written to
///
/// Uses the configured directory, else `<XDG pictures>/picam`, else
/// `./picam` when no picture directory is known.
pub fn photo_directory(config: &Config) -> PathBuf {
    configured_or(config.photo_directory.as_deref(), dirs::picture_dir())
}

/// Directory recordings are written to
pub fn video_directory(config: &Config) -> PathBuf {
    configured_or(config.video_directory.as_deref(), dirs::video_dir())
}

fn configured_or(configured: Option<&str>, xdg: Option<PathBuf>) -> PathBuf {
    match configured {
        Some(dir) if !dir.trim().is_empty() => expand_home(dir.trim()),
        _ => xdg
            .unwrap_or_else(|| PathBuf::from("."))
            .join(files::APP_DIRECTORY),
    }
}

/// Expand a leading `~/` using the home directory
fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(dir)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    debug!(path = %dir.display(), "Directory ready");
    Ok(dir.to_path_buf())
}

/// `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.<ext>`, suffixed `_1`, `_2`, ... if taken
pub fn timestamped_path<Tz>(dir: &Path, prefix: &str, extension: &str, now: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stem = format!("{}_{}", prefix, now.format("%Y%m%d_%H%M%S"));
    let candidate = dir.join(format!("{}.{}", stem, extension));
    if !candidate.exists() {
        return candidate;
    }

    (1u32..)
        .map(|n| dir.join(format!("{}_{}.{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
