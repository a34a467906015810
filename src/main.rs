//! Video Player
//!
//! Plays a single video file in a window, decoding and presenting frames
//! at the stream's frame rate.

mod app;
mod config;
mod error;
mod video;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use app::PlayerApp;
use config::{FrameRateMode, PlayerConfig};
use video::{FfmpegBackend, FramePipeline};

/// Video Player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the video file to play
    path: PathBuf,

    /// Path to a JSON player configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate used when the stream does not declare one
    #[arg(long)]
    default_fps: Option<f64>,

    /// How fractional frame rates are turned into whole ones
    #[arg(long, value_enum)]
    frame_rate_mode: Option<FrameRateMode>,

    /// Disable vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Resolve the effective configuration: CLI over file over defaults
    fn player_config(&self) -> Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config from: {:?}", path);
                PlayerConfig::load_from_file(path)?
            }
            None => PlayerConfig::default(),
        };

        if let Some(fps) = self.default_fps {
            config.default_frame_rate = fps;
        }
        if let Some(mode) = self.frame_rate_mode {
            config.frame_rate_mode = mode;
        }
        if self.no_vsync {
            config.vsync = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    // RUST_LOG takes precedence over --debug
    let level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Video Player starting...");

    let config = args.player_config().context("Failed to load configuration")?;

    // Startup failures end the process here, before any window exists
    let pipeline = FramePipeline::open(&FfmpegBackend::new(), &args.path, &config)
        .with_context(|| format!("Failed to open video {}", args.path.display()))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::window_size(pipeline.width(), pipeline.height()))
            .with_resizable(false)
            .with_title(config.window_title.clone()),
        vsync: config.vsync,
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| Ok(Box::new(PlayerApp::new(cc, pipeline, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
