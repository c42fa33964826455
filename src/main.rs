// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use cosmic::Application;
use picam::app::{AppModel, Flags};
use picam::backends::camera::libcamera::{FocusSettings, LibcameraSession, SessionSettings};
use picam::config::Config;
use picam::constants::focus;
use picam::controls;
use picam::errors::AppError;
use picam::model::{CaptureFormat, FocusMode};
use picam::{i18n, storage};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "picam")]
#[command(about = "Camera application for the Raspberry Pi camera modules")]
#[command(version)]
struct Cli {
    /// libcamera camera name (default: first camera)
    #[arg(short, long)]
    camera: Option<String>,

    /// Initial still format: jpeg, png, tiff or raw
    #[arg(short, long, value_parser = parse_format)]
    format: Option<CaptureFormat>,

    /// Initial focus mode: auto, continuous or manual
    #[arg(long, value_parser = parse_focus_mode)]
    focus: Option<FocusMode>,
}

fn parse_format(value: &str) -> Result<CaptureFormat, String> {
    CaptureFormat::try_from(value)
}

fn parse_focus_mode(value: &str) -> Result<FocusMode, String> {
    FocusMode::try_from(value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=picam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    let mut config = Config::load(AppModel::APP_ID);
    if let Some(camera) = cli.camera {
        config.camera_name = Some(camera);
    }
    if let Some(format) = cli.format {
        config.capture_format = format;
    }
    if let Some(mode) = cli.focus {
        config.focus_mode = mode;
    }

    let session_settings = SessionSettings {
        camera_name: config.camera_name.clone(),
        photo_dir: storage::photo_directory(&config),
        video_dir: storage::video_directory(&config),
        jpeg_quality: config.jpeg_quality(),
        bitrate_preset: config.bitrate_preset,
    };
    let focus_settings = FocusSettings::new(
        config.focus_mode,
        Some(config.lens_position.clamp(0.0, focus::LENS_POSITION_MAX)),
    );
    info!(
        camera = ?session_settings.camera_name,
        photos = %session_settings.photo_dir.display(),
        videos = %session_settings.video_dir.display(),
        "Opening camera session"
    );

    let session = LibcameraSession::open(
        session_settings,
        config.preview_resolution,
        focus_settings,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to open camera");
        AppError::Camera(e)
    })?;

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default()
        .size(cosmic::iced::Size::new(
            config.preview_width as f32 + 340.0,
            config.preview_height as f32 + 120.0,
        ))
        .size_limits(
            cosmic::iced::Limits::NONE
                .min_width(360.0)
                .min_height(180.0),
        );

    let session = Arc::new(session);
    let flags = Flags {
        config,
        session: session.clone(),
    };
    let result = cosmic::app::run::<AppModel>(settings, flags);

    // The window is gone; an unfinished MP4 would be unplayable
    if let Some(feedback) = controls::shutdown(session.as_ref()) {
        info!(?feedback, "Camera closed");
    }
    result?;

    Ok(())
}
