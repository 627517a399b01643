pub mod cleanup;
pub mod employee;
pub mod errors;
pub mod game;
pub mod input;
pub mod loader;
pub mod registry;
pub mod report;
pub mod score;
pub mod surface;
pub mod theme;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::Arc;

    use crate::employee::Employee;
    use crate::game::GameContext;
    use crate::input::InputHub;
    use crate::loader::EngineLoader;
    use crate::report::{ScoreReceipt, ScoreReporter};
    use crate::surface::{FramePacket, Surface, SurfaceSize};
    use crate::theme::ThemeColors;
    use tokio::sync::{mpsc, watch};

    /// Create `n` test employees with sequential ids starting at 1.
    pub fn make_employees(n: usize) -> Vec<Employee> {
        (0..n)
            .map(|i| Employee {
                id: (i + 1) as u32,
                name: format!("Employee{}", i + 1),
                avatar: None,
            })
            .collect()
    }

    /// Everything the host side keeps when handing a context to a module.
    pub struct ContextHarness {
        pub frames: mpsc::UnboundedReceiver<FramePacket>,
        pub resize: watch::Sender<SurfaceSize>,
        pub input: InputHub,
        pub receipt: ScoreReceipt,
    }

    /// Build a fully wired `GameContext` plus the host-side handles needed
    /// to observe and drive it from a test.
    pub fn make_context() -> (GameContext, ContextHarness) {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (resize_tx, resize_rx) = watch::channel(SurfaceSize {
            width: 640.0,
            height: 360.0,
        });
        let input = InputHub::new(64);
        let (reporter, receipt) = ScoreReporter::channel();
        let ctx = GameContext {
            surface: Surface::new(frames_tx, resize_rx),
            input: input.subscribe(),
            theme: ThemeColors::default(),
            reporter,
            engine: Arc::new(EngineLoader::new()),
        };
        let harness = ContextHarness {
            frames: frames_rx,
            resize: resize_tx,
            input,
            receipt,
        };
        (ctx, harness)
    }
}
