use std::sync::Arc;
use std::time::Duration;

use crate::cleanup::CleanupHandle;
use crate::input::InputStream;
use crate::loader::EngineLoader;
use crate::registry::GameKey;
use crate::report::ScoreReporter;
use crate::surface::Surface;
use crate::theme::ThemeColors;

/// Static facts about a game, used for menus and for load planning.
#[derive(Debug, Clone)]
pub struct GameMetadata {
    pub key: GameKey,
    pub title: &'static str,
    pub blurb: &'static str,
    /// Rough round length shown to the player; not enforced.
    pub estimated_duration: Duration,
    /// Whether `start` will call into the shared 3D engine. The host warms
    /// the engine before mounting such a module.
    pub requires_engine: bool,
}

/// Everything a module receives when mounted. The context is consumed by
/// `start`; a module never outlives its context's surface.
pub struct GameContext {
    /// Exclusive drawing region for this round.
    pub surface: Surface,
    /// Fresh input subscription, valid until cleanup.
    pub input: InputStream,
    /// Company palette for this deployment.
    pub theme: ThemeColors,
    /// Exactly-once score callback for this round.
    pub reporter: ScoreReporter,
    /// Shared engine loader; only engine-backed games touch it.
    pub engine: Arc<EngineLoader>,
}

/// The contract every arcade mini-game implements.
///
/// `start` mounts the game and returns immediately with a cleanup handle;
/// the game itself runs on spawned tasks. The module must report its score
/// through `ctx.reporter` exactly once, and the returned handle must fully
/// release the surface when invoked, whether the round finished or was
/// aborted mid-run.
pub trait GameModule: Send {
    fn metadata(&self) -> GameMetadata;

    fn start(self: Box<Self>, ctx: GameContext) -> CleanupHandle;
}
