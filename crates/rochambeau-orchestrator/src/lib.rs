//! Tick loop coordinating camera, detector, round engine and renderer.

pub mod round;

use rochambeau_controller::{CommandSource, FrameSource};
use rochambeau_engine::Opponent;
use rochambeau_ops::{MatchSummary, TelemetryStore};
use rochambeau_types::{
    clock::Clock,
    events::{EventPayload, GameEvent, LifecyclePhase, OpsEvent},
    Result,
};
use rochambeau_vision::{GestureDetector, LandmarkProvider, Renderer};
use tracing::{debug, info, warn};

pub use round::{MatchState, Phase, RoundEngine, Transition, DEFAULT_MOVE};

/// Whether the loop keeps going after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Orchestrator<F, P, R, K, O, C>
where
    F: FrameSource,
    P: LandmarkProvider,
    R: Renderer,
    K: CommandSource,
    O: Opponent,
    C: Clock,
{
    camera: F,
    detector: GestureDetector<P>,
    renderer: R,
    commands: K,
    engine: RoundEngine<O, C>,
    telemetry: TelemetryStore,
    max_ticks: Option<u64>,
    ticks: u64,
}

impl<F, P, R, K, O, C> Orchestrator<F, P, R, K, O, C>
where
    F: FrameSource,
    P: LandmarkProvider,
    R: Renderer,
    K: CommandSource,
    O: Opponent,
    C: Clock,
{
    pub fn new(
        camera: F,
        detector: GestureDetector<P>,
        renderer: R,
        commands: K,
        engine: RoundEngine<O, C>,
        telemetry: TelemetryStore,
    ) -> Self {
        Self {
            camera,
            detector,
            renderer,
            commands,
            engine,
            telemetry,
            max_ticks: None,
            ticks: 0,
        }
    }

    /// Stop after this many ticks even without a quit command.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn engine(&self) -> &RoundEngine<O, C> {
        &self.engine
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn telemetry(&self) -> &TelemetryStore {
        &self.telemetry
    }

    /// Acquire the camera. A failure here is fatal and nothing is played.
    pub async fn boot(&mut self) -> Result<()> {
        self.publish(GameEvent::lifecycle(LifecyclePhase::Boot, "opening camera"))
            .await?;
        self.camera.open().await?;
        self.publish(GameEvent::lifecycle(LifecyclePhase::Ready, "camera ready"))
            .await?;
        Ok(())
    }

    /// Boot, then tick until quit. The camera is released on every path out.
    pub async fn run(&mut self) -> Result<MatchSummary> {
        let result = match self.boot().await {
            Ok(()) => self.run_loop().await,
            Err(err) => Err(err),
        };
        self.camera.release().await;

        let metrics = self.camera.metrics();
        let capture = GameEvent::new(EventPayload::Ops(OpsEvent {
            message: "capture metrics".into(),
            tags: vec![
                format!("delivered={}", metrics.delivered),
                format!("dropped={}", metrics.dropped),
            ],
        }));
        if let Err(err) = self.publish(capture).await {
            warn!("failed to record capture metrics: {err}");
        }

        let details = match &result {
            Ok(()) => "quit".to_string(),
            Err(err) => format!("aborted: {err}"),
        };
        if let Err(err) = self
            .publish(GameEvent::lifecycle(LifecyclePhase::Shutdown, details))
            .await
        {
            warn!("failed to record shutdown: {err}");
        }
        result?;

        let summary = self.telemetry.summary().await;
        info!(
            "Match over after {} rounds: player {} / cpu {} / draws {}",
            summary.rounds, summary.player_wins, summary.cpu_wins, summary.draws
        );
        Ok(summary)
    }

    async fn run_loop(&mut self) -> Result<()> {
        loop {
            if self.max_ticks.is_some_and(|max| self.ticks >= max) {
                info!("Tick limit of {} reached", self.ticks);
                return Ok(());
            }
            if self.tick_once().await? == Flow::Quit {
                info!("Quit requested after {} ticks", self.ticks);
                return Ok(());
            }
        }
    }

    /// One frame: acquire, classify, update state, render, read input.
    pub async fn tick_once(&mut self) -> Result<Flow> {
        self.ticks += 1;
        let Some(mut frame) = self.camera.next_frame().await? else {
            debug!(tick = self.ticks, "no frame delivered; skipping tick");
            return Ok(Flow::Continue);
        };

        let detection = self.detector.detect(&frame);
        self.engine.observe_gesture(detection.gesture);
        let resolved = self.engine.tick();

        let mut view = self.engine.hud(detection.gesture);
        view.handedness = detection.handedness;
        view.wrist = detection.wrist;
        view.fresh_result = resolved.is_some();
        if let Some(record) = resolved {
            self.publish(GameEvent::new(EventPayload::RoundResolved(record)))
                .await?;
        }

        self.renderer.render(&mut frame, &view)?;

        let Some(command) = self.commands.poll(&view)? else {
            return Ok(Flow::Continue);
        };
        match self.engine.handle(command) {
            Transition::Quit => Ok(Flow::Quit),
            Transition::RoundStarted(round) => {
                self.publish(GameEvent::new(EventPayload::RoundStarted { round }))
                    .await?;
                Ok(Flow::Continue)
            }
            Transition::Ignored => Ok(Flow::Continue),
        }
    }

    async fn publish(&mut self, event: GameEvent) -> Result<()> {
        self.renderer.on_event(&event);
        self.telemetry.record_event(event).await
    }
}
