use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::store::DocumentStore;

pub type SharedSessions = Arc<RwLock<HashSet<String>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub sessions: SharedSessions,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(DocumentStore::new(&config.data_dir)),
            sessions: Arc::new(RwLock::new(HashSet::new())),
            config: Arc::new(config),
        }
    }
}
