pub mod sim;

use std::time::Duration;

use arcade_core::cleanup::{CleanupHandle, ResourceBag};
use arcade_core::game::{GameContext, GameMetadata, GameModule};
use arcade_core::input::{InputEvent, KeyCode};
use arcade_core::registry::GameKey;
use arcade_core::surface::{CanvasFrame, DrawOp, FramePacket};
use arcade_core::theme::{ThemeColors, ThemeRole};

use sim::DriverSim;

const FRAME: Duration = Duration::from_millis(16);

/// Speed Driver: steer between four lanes of accelerating traffic.
pub struct SpeedDriver {
    seed: u64,
}

impl SpeedDriver {
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SpeedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModule for SpeedDriver {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            key: GameKey::Driver,
            title: "Speed Driver",
            blurb: "Weave through four lanes of traffic. Survive for points, dodge for bonuses.",
            estimated_duration: Duration::from_secs(45),
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
    let mut sim = DriverSim::new(seed);
    let mut interval = tokio::time::interval(FRAME);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        while let Some(event) = ctx.input.try_next() {
            match event {
                InputEvent::Key { code, pressed } => match code {
                    KeyCode::ArrowLeft | KeyCode::KeyA => sim.steering.left = pressed,
                    KeyCode::ArrowRight | KeyCode::KeyD => sim.steering.right = pressed,
                    _ => {},
                },
                InputEvent::PointerMove { x, .. } => sim.steer_to(x * sim::WIDTH),
                _ => {},
            }
        }

        sim.step();
        ctx.surface
            .present(FramePacket::Canvas(render(&sim, &ctx.theme)));

        if sim.crashed {
            tracing::debug!(score = sim.rounded_score(), "run ended on collision");
            ctx.reporter.report(sim.score.round());
            return;
        }
    }
}

fn render(sim: &DriverSim, theme: &ThemeColors) -> CanvasFrame {
    let mut frame = CanvasFrame::new(
        sim::WIDTH,
        sim::HEIGHT,
        theme.rgba(ThemeRole::Background, 1.0),
    );
    // Center lane marker; the page dashes it client-side.
    frame.push(DrawOp::Line {
        x1: sim::WIDTH / 2.0,
        y1: 0.0,
        x2: sim::WIDTH / 2.0,
        y2: sim::HEIGHT,
        width: 4.0,
        color: [1.0, 1.0, 1.0, 0.2],
    });
    frame.push(DrawOp::Rect {
        x: sim.car_x,
        y: sim::CAR_Y,
        w: sim::CAR_WIDTH,
        h: sim::CAR_HEIGHT,
        color: theme.rgba(ThemeRole::Accent, 1.0),
    });
    for block in &sim.traffic {
        frame.push(DrawOp::Rect {
            x: block.x,
            y: block.y,
            w: block.width,
            h: block.height,
            color: theme.rgba(ThemeRole::Secondary, 1.0),
        });
    }
    frame.push(DrawOp::Text {
        x: 16.0,
        y: 24.0,
        size: 16.0,
        color: theme.rgba(ThemeRole::Text, 1.0),
        content: format!("Score {}", sim.rounded_score()),
    });
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::make_context;

    #[tokio::test(start_paused = true)]
    async fn parked_in_a_lane_crashes_and_reports() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(SpeedDriver::seeded(9)).start(ctx);

        // Park the car on the second lane center so spawned traffic in
        // that lane must eventually hit it.
        harness.input.dispatch(InputEvent::PointerMove { x: 0.375, y: 0.5 });

        // Drain frames until the loop task finishes and drops its sender.
        while harness.frames.recv().await.is_some() {}

        let score = harness.receipt.recv().await;
        assert!(score.is_some());
        assert!(score.unwrap() >= 0.0);
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn pointer_input_moves_the_car() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(SpeedDriver::seeded(9)).start(ctx);

        harness.input.dispatch(InputEvent::PointerMove { x: 0.1, y: 0.5 });

        // After a couple of frames the car rect should sit left of center.
        let mut car_x = None;
        for _ in 0..5 {
            if let Some(FramePacket::Canvas(frame)) = harness.frames.recv().await {
                for op in &frame.ops {
                    if let DrawOp::Rect { x, h, .. } = op {
                        if *h == sim::CAR_HEIGHT {
                            car_x = Some(*x);
                        }
                    }
                }
            }
        }
        let car_x = car_x.expect("car should be drawn every frame");
        assert!(car_x < sim::WIDTH / 2.0 - sim::CAR_WIDTH / 2.0);
        cleanup.invoke();
    }

    #[test]
    fn metadata_is_self_clocked() {
        let meta = SpeedDriver::new().metadata();
        assert_eq!(meta.key, GameKey::Driver);
        assert!(!meta.requires_engine);
    }
}
