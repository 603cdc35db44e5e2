// nearsight command line
// Replays recorded depth traces through the alert engine and checks config files

mod sinks;
mod trace;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use image::{DynamicImage, RgbImage};
use nearsight_cns::frame_loop::{self, FrameMessage};
use nearsight_cns::{Collaborators, Coordinator, DepthCapability, NearsightConfig};
use nearsight_eye::{CapturedImage, ScriptedEngine};
use nearsight_spk::{EspeakSynthesizer, SpeechAnnouncer, SpeechSynthesizer};
use sinks::{LogPlayer, LogSynthesizer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use trace::TraceEvent;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated length of one cue playback
const CUE_DURATION: Duration = Duration::from_millis(150);

#[derive(Parser)]
#[command(name = "nearsight")]
#[command(about = "Obstacle alert engine for depth-sensing cameras", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded trace through the alert engine
    Replay {
        /// JSON-lines trace of distances and capture results
        #[arg(long)]
        trace: PathBuf,

        /// Configuration file (TOML)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Frames per second
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Speak through espeak-ng instead of logging
        #[arg(long)]
        espeak: bool,

        /// Simulate a device without scene depth
        #[arg(long)]
        no_depth: bool,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Configuration file (TOML)
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    let result = match cli.command {
        Commands::Replay {
            trace,
            config,
            fps,
            espeak,
            no_depth,
        } => {
            replay(ReplayOptions {
                trace,
                config,
                fps,
                espeak,
                capability: DepthCapability::from_supported(!no_depth),
            })
            .await
        }
        Commands::CheckConfig { path } => check_config(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NearsightConfig> {
    match path {
        Some(path) => NearsightConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(NearsightConfig::default()),
    }
}

fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = load_config(Some(path))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

struct ReplayOptions {
    trace: PathBuf,
    config: Option<PathBuf>,
    fps: u32,
    espeak: bool,
    capability: DepthCapability,
}

async fn replay(options: ReplayOptions) -> anyhow::Result<()> {
    if options.fps == 0 {
        return Err(anyhow!("--fps must be at least 1"));
    }

    let config = load_config(options.config.as_deref())?;
    let file = File::open(&options.trace)
        .with_context(|| format!("opening trace {}", options.trace.display()))?;
    let events = trace::parse(BufReader::new(file))?;
    info!(events = events.len(), fps = options.fps, "replaying trace");

    let runtime = tokio::runtime::Handle::current();

    let synthesizer: Arc<dyn SpeechSynthesizer> = if options.espeak {
        Arc::new(EspeakSynthesizer::new())
    } else {
        Arc::new(LogSynthesizer::new())
    };
    let announcer = SpeechAnnouncer::new(config.speech.clone(), synthesizer, &runtime)?;

    let (player, mut completions) = LogPlayer::new(runtime.clone(), CUE_DURATION);
    let player = Arc::new(player);
    let engine = Arc::new(ScriptedEngine::new());

    let coordinator = Coordinator::new(
        &config,
        options.capability,
        Collaborators {
            player: player.clone(),
            announcer: Arc::new(announcer.clone()),
            engine: engine.clone(),
        },
        runtime,
    )?;

    let cue = coordinator.cue().clone();
    tokio::spawn(async move {
        while let Some(playback) = completions.recv().await {
            cue.on_playback_finished(playback);
        }
    });

    let capture = coordinator.capture_handle();
    let camera: CapturedImage = Arc::new(DynamicImage::ImageRgb8(RgbImage::new(640, 480)));

    let (frames, receiver) = frame_loop::channel(options.fps as usize);
    let frame_thread = frame_loop::spawn(coordinator, receiver)?;

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / options.fps as f64));
    let mut classifications: Vec<JoinHandle<Vec<String>>> = Vec::new();
    let mut dropped = 0usize;

    for (ordinal, event) in events.into_iter().enumerate() {
        ticker.tick().await;
        match event {
            TraceEvent::Distance { distance } => {
                let frame = trace::synthetic_frame(distance, ordinal as u64, &config.vision.depth);
                if frames
                    .try_send(FrameMessage::Frame(frame, Some(Arc::clone(&camera))))
                    .is_err()
                {
                    dropped += 1;
                }
            }
            TraceEvent::Capture { capture: detections } => {
                debug!(results = detections.len(), "capture");
                engine.push_detections(detections);
                let handle = capture
                    .capture_latest()
                    .unwrap_or_else(|| capture.on_capture_requested(Arc::clone(&camera)));
                classifications.push(handle);
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, "frame loop fell behind, frames dropped");
    }

    // disconnect ends the loop once queued frames are drained
    drop(frames);
    let coordinator = tokio::task::spawn_blocking(move || frame_thread.join())
        .await?
        .map_err(|_| anyhow!("frame loop panicked"))?;

    for handle in classifications {
        if let Err(e) = handle.await {
            warn!("classification task failed: {}", e);
        }
    }
    announcer.flush().await?;

    let status = coordinator.status();
    info!(plays = player.plays(), "replay finished");
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
