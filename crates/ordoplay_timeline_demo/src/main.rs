// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Timeline demo host
//!
//! Builds a sample sprite timeline, prints its schedule, scrubs through it,
//! then plays it in real time on a tokio interval ticker.
//!
//! ## Usage
//!
//! ```text
//! ordoplay_timeline_demo [clock.ron]
//! ```
//!
//! The optional argument is a RON [`ClockConfig`]; defaults are used without it.

mod driver;
mod sample;

use ordoplay_timeline::{ClockConfig, HostId, Timeline, TimelineError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Safety limit for the real-time run
const MAX_TICKS: u32 = 10_000;

/// Demo host errors
#[derive(Debug, Error)]
pub enum DemoError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Authoring, playback or config parsing failed
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
    /// Listing could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Driver cannot tick at the configured rate
    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(f32),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ordoplay_timeline=debug,ordoplay_timeline_demo=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay Timeline demo v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config_path.as_deref())) {
        tracing::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

async fn load_config(path: Option<&Path>) -> Result<ClockConfig, DemoError> {
    let Some(path) = path else {
        return Ok(ClockConfig::default());
    };

    let content = tokio::fs::read_to_string(path).await?;
    let config = ClockConfig::from_ron(&content)?;
    tracing::info!("Loaded clock config from {}", path.display());
    Ok(config)
}

async fn run(config_path: Option<&Path>) -> Result<(), DemoError> {
    let config = load_config(config_path).await?;
    tracing::info!(
        "Clock: {} at {:.1} fps, time scale {:.2}, fixed step {:.3}",
        config.mode.name(),
        config.frame_rate,
        config.time_scale,
        config.fixed_step
    );

    let host = HostId::new();

    // Preview: scrub a copy of the sample
    let (mut preview, sprite) = sample::build(host, config.mode)?;
    preview.scrub_to(0.0)?;
    print_schedule(&preview)?;

    let duration = preview.duration();
    for timecode in [0.75, 1.5, 1.7, duration] {
        preview.scrub_to(timecode)?;
        tracing::info!("Scrubbed to {:.2}: {}", timecode, serde_json::to_string(&*sprite.borrow())?);
    }

    // Real-time playback
    let (mut timeline, sprite) = sample::build(host, config.mode)?;
    let report = driver::drive(&mut timeline, &config, MAX_TICKS).await?;
    tracing::info!(
        "Played {:.2}s of timeline in {} ticks ({:.2}s wall time, finished: {})",
        timeline.play_time(),
        report.ticks,
        report.wall_time.as_secs_f32(),
        report.finished
    );
    println!("{}", serde_json::to_string_pretty(&*sprite.borrow())?);

    Ok(())
}

fn print_schedule(timeline: &Timeline) -> Result<(), DemoError> {
    tracing::info!("Timeline {} ({:.2}s):", timeline.id(), timeline.duration());
    for event in timeline.events() {
        tracing::info!("  {}", event);
    }
    println!("{}", serde_json::to_string_pretty(&timeline.describe())?);
    Ok(())
}
