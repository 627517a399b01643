use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use arcade_core::employee::Employee;
use arcade_core::errors::ModuleLoadError;
use arcade_core::game::{GameContext, GameModule};
use arcade_core::input::InputHub;
use arcade_core::registry::{GameKey, GameOrder};
use arcade_core::report::ScoreReporter;
use arcade_core::score::ScoreEntry;
use arcade_core::surface::{FramePacket, Surface, SurfaceSize};
use arcade_core::theme::ThemeColors;
use arcade_core::time::today_iso;

use crate::loader::GameLoader;
use crate::sink::ScoreSink;

const LOAD_ATTEMPTS: u32 = 3;
const LOAD_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no employee selected")]
    NoPlayer,
    #[error("a session is already running")]
    AlreadyRunning,
}

/// Progress notifications for the page chrome, emitted in order.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    GameStarted {
        /// 1-based position within the order.
        position: usize,
        total: usize,
        key: GameKey,
    },
    ScoreRecorded {
        key: GameKey,
        score: f64,
        running_total: f64,
    },
    GameLoadFailed {
        key: GameKey,
        error: String,
    },
    Finished {
        total: i64,
        persisted: bool,
    },
}

/// Terminal state of a completed session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub total: i64,
    pub persisted: bool,
    pub breakdown: Vec<(GameKey, f64)>,
}

/// Drives one player's run through the configured game order.
///
/// Exactly one module is mounted at a time; each gets a fresh surface
/// binding and input subscription, and its score report is awaited before
/// its cleanup handle runs and the surface is cleared for the next game.
pub struct SessionOrchestrator {
    loader: Arc<GameLoader>,
    sink: Arc<dyn ScoreSink>,
    theme: ThemeColors,
    input: InputHub,
    frames: mpsc::UnboundedSender<FramePacket>,
    size: watch::Receiver<SurfaceSize>,
    events: mpsc::UnboundedSender<SessionEvent>,
    running: AtomicBool,
}

impl SessionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loader: Arc<GameLoader>,
        sink: Arc<dyn ScoreSink>,
        theme: ThemeColors,
        input: InputHub,
        frames: mpsc::UnboundedSender<FramePacket>,
        size: watch::Receiver<SurfaceSize>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            loader,
            sink,
            theme,
            input,
            frames,
            size,
            events,
            running: AtomicBool::new(false),
        }
    }

    /// The hub page input flows into. Each mounted module subscribes to it.
    pub fn input(&self) -> &InputHub {
        &self.input
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run a full session. Rejects when no player is selected or another
    /// session is still in flight.
    pub async fn run(
        &self,
        player: Option<Employee>,
        order: GameOrder,
    ) -> Result<SessionOutcome, SessionError> {
        let player = player.ok_or(SessionError::NoPlayer)?;
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyRunning);
        }
        let outcome = self.drive(player, order).await;
        self.running.store(false, Ordering::SeqCst);
        Ok(outcome)
    }

    async fn drive(&self, player: Employee, order: GameOrder) -> SessionOutcome {
        let total_games = order.len();
        let mut total = 0.0_f64;
        let mut breakdown = Vec::with_capacity(total_games);

        tracing::info!(
            player = %player.name,
            games = total_games,
            "session started"
        );

        for (index, key) in order.into_iter().enumerate() {
            self.emit(SessionEvent::GameStarted {
                position: index + 1,
                total: total_games,
                key,
            });

            let module = match self.load_with_retry(key).await {
                Ok(module) => module,
                Err(err) => {
                    tracing::error!(%key, error = %err, "giving up on game, scoring zero");
                    self.emit(SessionEvent::GameLoadFailed {
                        key,
                        error: err.to_string(),
                    });
                    breakdown.push((key, 0.0));
                    continue;
                },
            };

            let score = self.play(module).await;
            total += score;
            breakdown.push((key, score));
            self.emit(SessionEvent::ScoreRecorded {
                key,
                score,
                running_total: total,
            });
        }

        let total = total.floor() as i64;
        let entry = ScoreEntry {
            player_id: player.id,
            player_name: player.name,
            score: total,
            date: today_iso(),
        };
        let persisted = match self.sink.save(&entry).await {
            Ok(()) => true,
            Err(err) => {
                // The player still sees the locally computed score.
                tracing::warn!(error = %err, "score not persisted");
                false
            },
        };

        tracing::info!(total, persisted, "session finished");
        self.emit(SessionEvent::Finished { total, persisted });
        SessionOutcome {
            total,
            persisted,
            breakdown,
        }
    }

    /// Mount one module, await its single report, then tear it down and
    /// clear the surface for the next one.
    async fn play(&self, module: Box<dyn GameModule>) -> f64 {
        let key = module.metadata().key;
        let (reporter, receipt) = ScoreReporter::channel();
        let ctx = GameContext {
            surface: Surface::new(self.frames.clone(), self.size.clone()),
            input: self.input.subscribe(),
            theme: self.theme.clone(),
            reporter,
            engine: self.loader.engine(),
        };
        let cleanup = module.start(ctx);

        let score = match receipt.recv().await {
            Some(score) => score,
            None => {
                tracing::error!(%key, "module ended without reporting, scoring zero");
                0.0
            },
        };

        cleanup.invoke();
        let _ = self.frames.send(FramePacket::Clear);
        score
    }

    async fn load_with_retry(&self, key: GameKey) -> Result<Box<dyn GameModule>, ModuleLoadError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.loader.load(key).await {
                Ok(module) => return Ok(module),
                // A key missing from the catalog will not appear on retry.
                Err(err @ ModuleLoadError::Unregistered(_)) => return Err(err),
                Err(err) if attempt < LOAD_ATTEMPTS => {
                    tracing::warn!(%key, attempt, error = %err, "game load failed, retrying");
                    tokio::time::sleep(LOAD_BACKOFF).await;
                },
                Err(err) => return Err(err),
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
