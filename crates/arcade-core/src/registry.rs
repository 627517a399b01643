use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::GameModule;

/// The closed identifier space of arcade mini-games. Using an enum keeps
/// game references type-checkable instead of runtime-constructed paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKey {
    Jump,
    Driver,
    Reaction,
    Orbital,
    Rally,
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameKey::Jump => "jump",
            GameKey::Driver => "driver",
            GameKey::Reaction => "reaction",
            GameKey::Orbital => "orbital",
            GameKey::Rally => "rally",
        };
        write!(f, "{name}")
    }
}

/// Ordered sequence of games making up one session. May repeat or omit
/// entries; a session snapshots it at start.
pub type GameOrder = Vec<GameKey>;

/// Factory producing a fresh module instance per session step.
pub type GameFactory = fn() -> Box<dyn GameModule>;

/// Mapping from game key to module factory, populated at startup.
#[derive(Default)]
pub struct GameRegistry {
    factories: HashMap<GameKey, GameFactory>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: GameKey, factory: GameFactory) {
        self.factories.insert(key, factory);
    }

    pub fn create(&self, key: GameKey) -> Option<Box<dyn GameModule>> {
        self.factories.get(&key).map(|f| f())
    }

    pub fn contains(&self, key: GameKey) -> bool {
        self.factories.contains_key(&key)
    }

    /// Number of registered game types.
    pub fn available_games(&self) -> usize {
        self.factories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_serialize_to_snake_case_strings() {
        assert_eq!(serde_json::to_string(&GameKey::Jump).unwrap(), r#""jump""#);
        let key: GameKey = serde_json::from_str(r#""rally""#).unwrap();
        assert_eq!(key, GameKey::Rally);
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        assert!(serde_json::from_str::<GameKey>(r#""pinball""#).is_err());
    }

    #[test]
    fn empty_registry_creates_nothing() {
        let registry = GameRegistry::new();
        assert!(registry.create(GameKey::Jump).is_none());
        assert_eq!(registry.available_games(), 0);
    }

    #[test]
    fn order_parses_from_settings_json() {
        let order: GameOrder =
            serde_json::from_str(r#"["jump", "reaction", "jump", "orbital"]"#).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], order[2]);
    }
}
