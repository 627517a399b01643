use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use arcade_core::employee::Employee;
use arcade_core::registry::GameOrder;
use arcade_core::score::ScoreEntry;

/// Arcade settings as the admin panel saves them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDocument {
    pub theme: serde_json::Value,
    pub game_order: GameOrder,
}

/// Flat-file JSON documents under the data directory.
///
/// Every write goes through one async mutex and lands via temp file plus
/// rename, so concurrent handlers see either the old document or the new
/// one, never a torn file. Scores are append-only; settings and the
/// employee roster are replaced wholesale.
pub struct DocumentStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn settings(&self) -> SettingsDocument {
        self.read_document("settings").await.unwrap_or_default()
    }

    pub async fn replace_settings(&self, settings: &SettingsDocument) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document("settings", settings).await
    }

    pub async fn employees(&self) -> Vec<Employee> {
        self.read_document("employees").await.unwrap_or_default()
    }

    pub async fn replace_employees(&self, employees: &[Employee]) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document("employees", &employees).await
    }

    pub async fn scores(&self) -> Vec<ScoreEntry> {
        self.read_document("scores").await.unwrap_or_default()
    }

    pub async fn append_score(&self, entry: ScoreEntry) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut scores: Vec<ScoreEntry> = self.read_document("scores").await.unwrap_or_default();
        scores.push(entry);
        self.write_document("scores", &scores).await
    }

    async fn read_document<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let raw = tokio::fs::read_to_string(self.path(name)).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(document = name, error = %e, "stored document is unreadable");
                None
            },
        }
    }

    async fn write_document<T: Serialize>(&self, name: &str, value: &T) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let raw = serde_json::to_vec_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = self.dir.join(format!("{name}.tmp"));
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, self.path(name)).await
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
