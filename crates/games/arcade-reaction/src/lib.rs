pub mod sim;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;

use arcade_core::cleanup::{CleanupHandle, ResourceBag};
use arcade_core::game::{GameContext, GameMetadata, GameModule};
use arcade_core::input::{InputEvent, KeyCode};
use arcade_core::registry::GameKey;
use arcade_core::surface::{CanvasFrame, DrawOp, FramePacket, Surface};
use arcade_core::theme::{ThemeColors, ThemeRole};

const COOLDOWN: Duration = Duration::from_millis(600);

/// Quick Tap: five reaction rounds against a randomly armed pad.
pub struct QuickTap {
    seed: u64,
}

impl QuickTap {
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for QuickTap {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModule for QuickTap {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            key: GameKey::Reaction,
            title: "Quick Tap",
            blurb: "Five rounds. Tap the instant the pad lights up; your average is the score.",
            estimated_duration: Duration::from_secs(20),
            requires_engine: false,
        }
    }

    fn start(self: Box<Self>, ctx: GameContext) -> CleanupHandle {
        let mut bag = ResourceBag::new();
        bag.register_task(tokio::spawn(run(self.seed, ctx)));
        bag.into_handle()
    }
}

fn is_tap(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::PointerDown { .. }
            | InputEvent::Key {
                code: KeyCode::Space,
                pressed: true,
            }
    )
}

async fn run(seed: u64, mut ctx: GameContext) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scores: Vec<u32> = Vec::new();

    for round in 1..=sim::ROUNDS {
        present_pad(&ctx.surface, &ctx.theme, round, "Wait for it...", Pad::Armed);

        // Arming phase: early taps are called out but do not reset the
        // countdown.
        let go_at = Instant::now() + sim::arm_delay(&mut rng);
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(go_at) => break,
                event = ctx.input.next() => match event {
                    Some(event) if is_tap(&event) => {
                        present_pad(&ctx.surface, &ctx.theme, round, "Too soon!", Pad::Armed);
                    },
                    Some(_) => {},
                    None => return,
                },
            }
        }

        present_pad(&ctx.surface, &ctx.theme, round, "Tap!", Pad::Live);
        let lit_at = Instant::now();

        let reaction_ms = loop {
            match ctx.input.next().await {
                Some(event) if is_tap(&event) => {
                    break lit_at.elapsed().as_secs_f64() * 1000.0;
                },
                Some(_) => {},
                None => return,
            }
        };

        let round_score = sim::round_score(reaction_ms);
        scores.push(round_score);
        tracing::debug!(round, reaction_ms, round_score, "round complete");
        present_pad(
            &ctx.surface,
            &ctx.theme,
            round,
            &format!("{}ms (+{round_score})", reaction_ms.round()),
            Pad::Hit,
        );

        if round < sim::ROUNDS {
            tokio::time::sleep(COOLDOWN).await;
        }
    }

    ctx.reporter.report(f64::from(sim::average(&scores)));
}

enum Pad {
    Armed,
    Live,
    Hit,
}

fn present_pad(surface: &Surface, theme: &ThemeColors, round: u32, message: &str, pad: Pad) {
    let size = surface.size();
    let mut frame = CanvasFrame::new(
        size.width,
        size.height,
        theme.rgba(ThemeRole::Background, 1.0),
    );
    let pad_color = match pad {
        Pad::Armed => [1.0, 1.0, 1.0, 0.05],
        Pad::Live => theme.rgba(ThemeRole::Accent, 1.0),
        Pad::Hit => theme.rgba(ThemeRole::Secondary, 1.0),
    };
    frame.push(DrawOp::Rect {
        x: size.width * 0.2,
        y: size.height * 0.25,
        w: size.width * 0.6,
        h: size.height * 0.5,
        color: pad_color,
    });
    frame.push(DrawOp::Text {
        x: size.width * 0.25,
        y: size.height * 0.55,
        size: 20.0,
        color: theme.rgba(ThemeRole::Text, 1.0),
        content: message.to_string(),
    });
    frame.push(DrawOp::Text {
        x: 16.0,
        y: 24.0,
        size: 14.0,
        color: theme.rgba(ThemeRole::Text, 1.0),
        content: format!("Round {round}/{}", sim::ROUNDS),
    });
    surface.present(FramePacket::Canvas(frame));
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::make_context;

    fn frame_text(packet: &FramePacket) -> Vec<String> {
        match packet {
            FramePacket::Canvas(frame) => frame
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { content, .. } => Some(content.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn instant_taps_average_one_hundred() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(QuickTap::seeded(5)).start(ctx);

        // Tap as soon as each live pad appears; the paused clock keeps the
        // measured reaction at zero.
        while let Some(packet) = harness.frames.recv().await {
            if frame_text(&packet).iter().any(|t| t == "Tap!") {
                harness.input.dispatch(InputEvent::PointerDown { x: 0.5, y: 0.5 });
            }
        }

        assert_eq!(harness.receipt.recv().await, Some(100.0));
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn early_tap_is_called_out_but_round_survives() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(QuickTap::seeded(5)).start(ctx);

        // First frame is the armed pad; tap too early.
        let first = harness.frames.recv().await.expect("armed frame");
        assert!(frame_text(&first).iter().any(|t| t == "Wait for it..."));
        harness.input.dispatch(InputEvent::PointerDown { x: 0.5, y: 0.5 });

        let mut saw_too_soon = false;
        while let Some(packet) = harness.frames.recv().await {
            let texts = frame_text(&packet);
            if texts.iter().any(|t| t == "Too soon!") {
                saw_too_soon = true;
            }
            if texts.iter().any(|t| t == "Tap!") {
                harness.input.dispatch(InputEvent::PointerDown { x: 0.5, y: 0.5 });
            }
        }

        assert!(saw_too_soon);
        assert_eq!(
            harness.receipt.recv().await,
            Some(100.0),
            "an early tap must not cost the player points"
        );
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_before_any_tap_reports_nothing() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(QuickTap::seeded(5)).start(ctx);

        harness.frames.recv().await;
        cleanup.invoke();
        while harness.frames.recv().await.is_some() {}
        assert_eq!(harness.receipt.recv().await, None);
    }
}
