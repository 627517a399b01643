pub mod sim;

use std::time::Duration;

use arcade_core::cleanup::{CleanupHandle, ResourceBag};
use arcade_core::game::{GameContext, GameMetadata, GameModule};
use arcade_core::input::{InputEvent, KeyCode};
use arcade_core::registry::GameKey;
use arcade_core::surface::{CanvasFrame, DrawOp, FramePacket};
use arcade_core::theme::{ThemeColors, ThemeRole};

use sim::JumpSim;

const FRAME: Duration = Duration::from_millis(16);

/// Jump Rush: endless runner where one button clears scrolling obstacles.
pub struct JumpRush {
    seed: u64,
}

impl JumpRush {
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for JumpRush {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModule for JumpRush {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            key: GameKey::Jump,
            title: "Jump Rush",
            blurb: "Time your jumps over the oncoming blocks. Each dodge is worth 10 points.",
            estimated_duration: Duration::from_secs(30),
            requires_engine: false,
        }
    }

    fn start(self: Box<Self>, ctx: GameContext) -> CleanupHandle {
        let mut bag = ResourceBag::new();
        bag.register_task(tokio::spawn(run(self.seed, ctx)));
        bag.into_handle()
    }
}

async fn run(seed: u64, mut ctx: GameContext) {
    let mut sim = JumpSim::new(seed);
    let mut interval = tokio::time::interval(FRAME);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        while let Some(event) = ctx.input.try_next() {
            match event {
                InputEvent::Key {
                    code: KeyCode::Space,
                    pressed: true,
                }
                | InputEvent::PointerDown { .. } => sim.jump(),
                _ => {},
            }
        }

        sim.step();
        ctx.surface
            .present(FramePacket::Canvas(render(&sim, &ctx.theme)));

        if sim.crashed {
            tracing::debug!(score = sim.score, "run ended on collision");
            ctx.reporter.report(f64::from(sim.score));
            return;
        }
    }
}

fn render(sim: &JumpSim, theme: &ThemeColors) -> CanvasFrame {
    let mut frame = CanvasFrame::new(
        sim::WIDTH,
        sim::HEIGHT,
        theme.rgba(ThemeRole::Background, 1.0),
    );
    frame.push(DrawOp::Rect {
        x: sim::PLAYER_X,
        y: sim.player_y,
        w: sim::PLAYER_WIDTH,
        h: sim::PLAYER_HEIGHT,
        color: theme.rgba(ThemeRole::Accent, 1.0),
    });
    for obstacle in &sim.obstacles {
        frame.push(DrawOp::Rect {
            x: obstacle.x,
            y: obstacle.top(),
            w: obstacle.width,
            h: obstacle.height,
            color: theme.rgba(ThemeRole::Secondary, 1.0),
        });
    }
    frame.push(DrawOp::Text {
        x: 20.0,
        y: 30.0,
        size: 16.0,
        color: theme.rgba(ThemeRole::Text, 1.0),
        content: format!("Score {}", sim.score),
    });
    frame
}
