//! Operational helpers: logging, telemetry, event logs.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex as StdMutex},
};

use chrono::{DateTime, Utc};
use rochambeau_types::{
    config::OpsConfig,
    events::{EventPayload, GameEvent},
    moves::Outcome,
    Result, RochambeauError,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| ops_error(format!("failed to create log filter: {err}")))?;

    match &config.log_file {
        Some(path) => {
            let file = open_append(Path::new(path))?;
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(StdMutex::new(file))
                .try_init()
        }
        None => fmt().with_env_filter(filter).try_init(),
    }
    .map_err(|err| ops_error(format!("tracing init error: {err}")))?;
    Ok(())
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| ops_error(format!("failed to create {}: {err}", parent.display())))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| ops_error(format!("failed to open {}: {err}", path.display())))
}

/// Tally of resolved rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub rounds: u32,
    pub player_wins: u32,
    pub cpu_wins: u32,
    pub draws: u32,
    pub defaulted_moves: u32,
    pub started_at: Option<DateTime<Utc>>,
}

impl MatchSummary {
    fn absorb(&mut self, event: &GameEvent) {
        match &event.payload {
            EventPayload::RoundResolved(record) => {
                self.rounds += 1;
                match record.outcome {
                    Outcome::PlayerWins => self.player_wins += 1,
                    Outcome::CpuWins => self.cpu_wins += 1,
                    Outcome::Draw => self.draws += 1,
                }
                if !record.gesture_seen {
                    self.defaulted_moves += 1;
                }
            }
            EventPayload::RoundStarted { .. } if self.started_at.is_none() => {
                self.started_at = Some(event.timestamp);
            }
            _ => {}
        }
    }
}

/// In-memory event store, optionally mirrored to an NDJSON file.
#[derive(Clone, Default)]
pub struct TelemetryStore {
    events: Arc<Mutex<Vec<GameEvent>>>,
    summary: Arc<Mutex<MatchSummary>>,
    log: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_log<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_append(path)?;
        info!("Writing event log to {}", path.display());
        Ok(Self {
            log: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
            ..Self::default()
        })
    }

    pub fn from_config(config: &OpsConfig) -> Result<Self> {
        match &config.event_log {
            Some(path) => Self::with_event_log(path),
            None => Ok(Self::new()),
        }
    }

    pub async fn record_event(&self, event: GameEvent) -> Result<()> {
        if let Some(log) = &self.log {
            let line = serde_json::to_string(&event)
                .map_err(|err| ops_error(format!("failed to encode event: {err}")))?;
            let mut writer = log.lock().await;
            writeln!(writer, "{line}")
                .and_then(|_| writer.flush())
                .map_err(|err| ops_error(format!("failed to write event log: {err}")))?;
        }
        self.summary.lock().await.absorb(&event);
        self.events.lock().await.push(event);
        Ok(())
    }

    pub async fn snapshot_events(&self) -> Vec<GameEvent> {
        self.events.lock().await.clone()
    }

    pub async fn summary(&self) -> MatchSummary {
        self.summary.lock().await.clone()
    }
}

pub fn ensure_capture_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    fs::create_dir_all(&dir)
        .map_err(|err| ops_error(format!("failed to create capture dir: {err}")))?;
    info!("Capture directory ready at {:?}", dir);
    Ok(dir)
}

pub fn ops_error(message: impl Into<String>) -> RochambeauError {
    RochambeauError::Ops(message.into())
}
