use async_trait::async_trait;
use serde::Deserialize;

use arcade_core::errors::PersistenceError;
use arcade_core::score::ScoreEntry;

/// Where finished sessions land and where the leaderboard reads from.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn save(&self, entry: &ScoreEntry) -> Result<(), PersistenceError>;

    async fn load(&self) -> Result<Vec<ScoreEntry>, PersistenceError>;
}

/// Sink talking to the arcade persistence service over HTTP.
pub struct HttpScoreSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScoreSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/api/scores", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct ScoresDocument {
    scores: Vec<ScoreEntry>,
}

#[async_trait]
impl ScoreSink for HttpScoreSink {
    async fn save(&self, entry: &ScoreEntry) -> Result<(), PersistenceError> {
        let response = self
            .client
            .post(self.url())
            .json(entry)
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ScoreEntry>, PersistenceError> {
        let response = self
            .client
            .get(self.url())
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let document: ScoresDocument = response
            .json()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;
        Ok(document.scores)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use arcade_core::score::rank_scores;
    use tokio::sync::Mutex;

    /// In-memory sink for orchestrator tests.
    #[derive(Default)]
    pub struct MemorySink {
        entries: Mutex<Vec<ScoreEntry>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn entries(&self) -> Vec<ScoreEntry> {
            self.entries.lock().await.clone()
        }
    }

    #[async_trait]
    impl ScoreSink for MemorySink {
        async fn save(&self, entry: &ScoreEntry) -> Result<(), PersistenceError> {
            self.entries.lock().await.push(entry.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Vec<ScoreEntry>, PersistenceError> {
            let entries = self.entries.lock().await.clone();
            Ok(rank_scores(entries))
        }
    }

    /// Sink that always fails, for the degraded-persistence path.
    pub struct FailingSink;

    #[async_trait]
    impl ScoreSink for FailingSink {
        async fn save(&self, _entry: &ScoreEntry) -> Result<(), PersistenceError> {
            Err(PersistenceError::Transport("connection refused".to_string()))
        }

        async fn load(&self) -> Result<Vec<ScoreEntry>, PersistenceError> {
            Err(PersistenceError::Transport("connection refused".to_string()))
        }
    }
}
