mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use rochambeau_controller::{Autopilot, CommandSource, FrameSource, MockCamera, ReplayCamera};
use rochambeau_engine::FrequencyOpponent;
use rochambeau_ops::{ensure_capture_dir, init_tracing, MatchSummary, TelemetryStore};
use rochambeau_orchestrator::{Orchestrator, RoundEngine};
use rochambeau_types::{clock::SystemClock, config::RochambeauConfig};
use rochambeau_vision::{
    provider_from_config, AssetStore, GestureDetector, LandmarkProvider, OverlayRenderer,
    Renderer,
};
use tracing::info;

use crate::ui::{KeyboardCommands, TerminalHud};

const TUI_LOG_FILE: &str = "logs/rochambeau.log";

#[derive(Debug, Parser)]
#[command(name = "rochambeau", about = "Rock-paper-scissors against the camera")]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "ROCHAMBEAU_CONFIG", default_value = "configs/dev.toml")]
    config: String,
    /// Directory of PNG frames to replay as the camera.
    #[arg(long)]
    frames: Option<String>,
    /// NDJSON landmark recording paired with the frames.
    #[arg(long)]
    landmarks: Option<String>,
    /// Seed for the opponent's random opening moves.
    #[arg(long)]
    seed: Option<u64>,
    /// Use a synthetic blank camera instead of replayed frames.
    #[arg(long)]
    mock_camera: bool,
    /// Play unattended without the terminal HUD.
    #[arg(long)]
    headless: bool,
    /// Rounds the headless autopilot plays before quitting.
    #[arg(long, default_value_t = 5)]
    rounds: u32,
    /// Stop after this many frames even if nobody quits.
    #[arg(long)]
    max_ticks: Option<u64>,
}

type Engine = RoundEngine<FrequencyOpponent, SystemClock>;
type Detector = GestureDetector<Box<dyn LandmarkProvider>>;
type Parts = (Box<dyn FrameSource>, Detector, Engine, TelemetryStore);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args.config);
    apply_overrides(&mut config, &args);

    init_tracing(&config.ops)?;
    info!("Starting rochambeau with config '{}'", args.config);

    let assets = AssetStore::load(&config.assets).context("failed to load assets")?;
    let mut overlay = OverlayRenderer::new(assets);
    if let Some(dir) = &config.ops.capture_dir {
        overlay = overlay.with_capture_dir(ensure_capture_dir(dir)?);
    }

    let detector = GestureDetector::new(provider_from_config(&config.detector)?);
    let opponent = FrequencyOpponent::from_config(&config.opponent);
    let engine = RoundEngine::new(&config.round, opponent, SystemClock);
    let telemetry = TelemetryStore::from_config(&config.ops)?;

    let camera: Box<dyn FrameSource> = if args.mock_camera {
        Box::new(MockCamera::new(config.camera.width, config.camera.height))
    } else {
        Box::new(ReplayCamera::new(config.camera.clone()))
    };

    let parts = (camera, detector, engine, telemetry);
    let summary = if args.headless {
        let pilot = Autopilot::new(args.rounds, config.camera.fps);
        play(parts, overlay, pilot, args.max_ticks).await?
    } else {
        let hud = TerminalHud::enter()?;
        play(parts, (overlay, hud), KeyboardCommands, args.max_ticks).await?
    };

    println!(
        "Rounds: {}  Player: {}  CPU: {}  Draws: {}  Defaulted: {}",
        summary.rounds,
        summary.player_wins,
        summary.cpu_wins,
        summary.draws,
        summary.defaulted_moves
    );
    Ok(())
}

/// Runs one match. The orchestrator, and the terminal it may hold, is dropped
/// before the summary is returned.
async fn play<R, K>(
    (camera, detector, engine, telemetry): Parts,
    renderer: R,
    commands: K,
    max_ticks: Option<u64>,
) -> Result<MatchSummary>
where
    R: Renderer,
    K: CommandSource,
{
    let mut orchestrator = Orchestrator::new(camera, detector, renderer, commands, engine, telemetry);
    if let Some(max_ticks) = max_ticks {
        orchestrator = orchestrator.with_max_ticks(max_ticks);
    }
    let summary = orchestrator.run().await?;
    Ok(summary)
}

fn apply_overrides(config: &mut RochambeauConfig, args: &Args) {
    if let Some(frames) = &args.frames {
        config.camera.frames_dir = frames.clone();
    }
    if let Some(landmarks) = &args.landmarks {
        config.detector.landmarks_path = Some(landmarks.clone());
    }
    if let Some(seed) = args.seed {
        config.opponent.seed = Some(seed);
    }
    if !args.headless && config.ops.log_file.is_none() {
        config.ops.log_file = Some(TUI_LOG_FILE.into());
    }
}

fn load_config(path: &str) -> RochambeauConfig {
    match RochambeauConfig::from_file(path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!("Invalid config in '{path}': {err}. Falling back to internal defaults.");
                RochambeauConfig::default()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{path}': {err}. Falling back to internal defaults."
            );
            RochambeauConfig::default()
        }
    }
}
