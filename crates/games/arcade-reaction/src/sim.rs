use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;

pub const ROUNDS: u32 = 5;

/// Random arming delay before the pad turns live.
pub fn arm_delay(rng: &mut StdRng) -> Duration {
    Duration::from_millis(800 + rng.random_range(0..1500))
}

/// Score one round from the measured reaction time. 100 points at an
/// instant tap, dropping one point per 10ms, floored at zero.
pub fn round_score(reaction_ms: f64) -> u32 {
    (100.0 - reaction_ms / 10.0).round().max(0.0) as u32
}

/// Final score is the rounded average over all completed rounds.
pub fn average(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().sum();
    (f64::from(sum) / scores.len() as f64).round() as u32
}
