use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::score::coerce_score;

/// The single authoritative score callback handed to a module.
///
/// A module must report exactly once per round; the reporter enforces the
/// guard side of that contract: the first call wins and every later call is
/// ignored, so a collision and a timer expiring in the same tick cannot
/// double-report.
#[derive(Clone)]
pub struct ScoreReporter {
    slot: Arc<Mutex<Option<oneshot::Sender<f64>>>>,
}

impl ScoreReporter {
    /// Create a reporter and the host-side receipt for its one report.
    pub fn channel() -> (ScoreReporter, ScoreReceipt) {
        let (tx, rx) = oneshot::channel();
        (
            ScoreReporter {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            ScoreReceipt { rx },
        )
    }

    /// Report the round's score. Non-finite or negative values are coerced
    /// to zero. Returns whether this call was the one that counted.
    pub fn report(&self, score: f64) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => {
                let _ = tx.send(coerce_score(score));
                true
            },
            None => {
                tracing::warn!(score, "duplicate score report ignored");
                false
            },
        }
    }

    /// Whether a score has already been reported through this reporter.
    pub fn has_reported(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

/// Host-side end of the score channel: resolves once, when the module
/// reports.
pub struct ScoreReceipt {
    rx: oneshot::Receiver<f64>,
}

impl ScoreReceipt {
    /// Wait for the module's single report. `None` means the module was
    /// torn down without ever reporting (the abort path).
    pub async fn recv(self) -> Option<f64> {
        self.rx.await.ok()
    }
}
