use std::sync::Arc;

use arcade_core::errors::ModuleLoadError;
use arcade_core::game::GameModule;
use arcade_core::loader::EngineLoader;
use arcade_core::registry::{GameKey, GameRegistry};

/// Resolves a game key to a ready-to-mount module.
///
/// Resolution itself is cheap (factories are compiled in); the async part is
/// warming the shared 3D engine before an engine-backed game mounts, so a
/// module never begins its round against a cold engine.
pub struct GameLoader {
    registry: GameRegistry,
    engine: Arc<EngineLoader>,
}

impl GameLoader {
    /// Loader over the built-in game catalog.
    pub fn new(engine: Arc<EngineLoader>) -> Self {
        let mut registry = GameRegistry::new();
        register_defaults(&mut registry);
        Self { registry, engine }
    }

    /// Loader over an explicit registry. Tests use this to stub games.
    pub fn with_registry(registry: GameRegistry, engine: Arc<EngineLoader>) -> Self {
        Self { registry, engine }
    }

    pub async fn load(&self, key: GameKey) -> Result<Box<dyn GameModule>, ModuleLoadError> {
        let module = self
            .registry
            .create(key)
            .ok_or(ModuleLoadError::Unregistered(key))?;
        if module.metadata().requires_engine {
            self.engine
                .ensure_loaded()
                .await
                .map_err(|err| ModuleLoadError::from(&*err))?;
            tracing::debug!(%key, "engine warm for module mount");
        }
        Ok(module)
    }

    pub fn contains(&self, key: GameKey) -> bool {
        self.registry.contains(key)
    }

    pub fn available_games(&self) -> usize {
        self.registry.available_games()
    }

    pub fn engine(&self) -> Arc<EngineLoader> {
        Arc::clone(&self.engine)
    }
}

fn register_defaults(registry: &mut GameRegistry) {
    #[cfg(feature = "jump")]
    registry.register(GameKey::Jump, || Box::new(arcade_jump::JumpRush::new()));
    #[cfg(feature = "driver")]
    registry.register(GameKey::Driver, || {
        Box::new(arcade_driver::SpeedDriver::new())
    });
    #[cfg(feature = "reaction")]
    registry.register(GameKey::Reaction, || {
        Box::new(arcade_reaction::QuickTap::new())
    });
    #[cfg(feature = "orbital")]
    registry.register(GameKey::Orbital, || {
        Box::new(arcade_orbital::OrbitalSprint::new())
    });
    #[cfg(feature = "rally")]
    registry.register(GameKey::Rally, || Box::new(arcade_rally::HoloRally::new()));
}
