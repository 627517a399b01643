use serde::{Deserialize, Serialize};

use crate::employee::EmployeeId;

/// One persisted leaderboard row. Append-only, write-once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: EmployeeId,
    pub player_name: String,
    pub score: i64,
    /// ISO date, date-only (`YYYY-MM-DD`).
    pub date: String,
}

/// Coerce a reported score to a finite non-negative number. NaN and
/// infinities count as zero, as do negative values.
pub fn coerce_score(score: f64) -> f64 {
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

/// Rank entries for leaderboard rendering: descending by score, stable so
/// ties keep their insertion order.
pub fn rank_scores(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}
