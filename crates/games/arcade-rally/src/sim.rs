use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const FRAME_SECS: f32 = 1.0 / 60.0;
/// 60 seconds at the 60 Hz frame rate.
pub const DURATION_FRAMES: u64 = 3600;
pub const RING_COUNT: usize = 9;

pub const CRAFT_Z: f32 = 2.0;
const CRAFT_LERP: f32 = 0.1;
const STEER_RANGE_X: f32 = 6.5;

const RESPAWN_Z: f32 = 8.0;
const PASS_WINDOW: f32 = 0.5;
const PRECISION_BASE: f32 = 1.8;
const PRECISION_FLOOR: f32 = 0.6;
const COMBO_STEP: f64 = 0.2;
const COMBO_CAP: f64 = 5.0;
const GATE_POINTS: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct Ring {
    pub position: Vec3,
    pub rotation: Vec3,
    pub passed: bool,
}

/// Hovercraft ring-run sim. Gates stream toward the craft; threading one
/// near its center builds a combo multiplier, clipping the rim resets it.
/// The run always lasts the full minute. One `step` is one 60 Hz frame.
pub struct RallySim {
    rng: StdRng,
    pub craft_x: f32,
    target_x: f32,
    pub rings: Vec<Ring>,
    pub frame: u64,
    pub elapsed: f32,
    pub distance: f64,
    pub gate_score: f64,
    pub combo: f64,
    pub finished: bool,
}

impl RallySim {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let rings = (0..RING_COUNT)
            .map(|i| Ring {
                position: Vec3::new(
                    (rng.random::<f32>() - 0.5) * 6.0,
                    (rng.random::<f32>() - 0.5) * 2.0,
                    -(i as f32) * 6.0 - 8.0,
                ),
                rotation: Vec3::ZERO,
                passed: false,
            })
            .collect();
        Self {
            rng,
            craft_x: 0.0,
            target_x: 0.0,
            rings,
            frame: 0,
            elapsed: 0.0,
            distance: 0.0,
            gate_score: 0.0,
            combo: 1.0,
            finished: false,
        }
    }

    /// Steer toward a normalized pointer x (0..1).
    pub fn steer(&mut self, x: f32) {
        self.target_x = (x - 0.5) * STEER_RANGE_X;
    }

    /// Keyboard steering: nudge the target sideways, clamped to the same
    /// range the pointer can reach.
    pub fn steer_by(&mut self, delta: f32) {
        let limit = STEER_RANGE_X / 2.0;
        self.target_x = (self.target_x + delta).clamp(-limit, limit);
    }

    pub fn live_score(&self) -> f64 {
        self.gate_score + self.distance * 4.0
    }

    /// Score reported at the finish line: the live score plus a distance
    /// bonus.
    pub fn final_score(&self) -> f64 {
        self.live_score() + self.distance * 2.0
    }

    /// Craft speed ramps up over the minute.
    fn speed(&self) -> f32 {
        0.025 + self.elapsed / 240.0
    }

    pub fn step(&mut self) {
        if self.finished {
            return;
        }

        // Integer frame count; an accumulated f32 drifts over a full run.
        self.frame += 1;
        self.elapsed = self.frame as f32 * FRAME_SECS;
        let speed = self.speed();
        self.distance += f64::from(speed) * 5.0;

        self.craft_x += (self.target_x - self.craft_x) * CRAFT_LERP;

        for i in 0..self.rings.len() {
            self.rings[i].position.z += speed * 12.0;
            self.rings[i].rotation.x += 0.01;
            self.rings[i].rotation.y += 0.02;

            if self.rings[i].position.z > RESPAWN_Z {
                let fresh = Vec3::new(
                    (self.rng.random::<f32>() - 0.5) * 6.0,
                    (self.rng.random::<f32>() - 0.5) * 2.0,
                    -50.0 - self.rng.random::<f32>() * 12.0,
                );
                self.rings[i].position = fresh;
                self.rings[i].passed = false;
            }

            let ring = &mut self.rings[i];
            if !ring.passed && (ring.position.z - CRAFT_Z).abs() < PASS_WINDOW {
                let proximity = (ring.position.x - self.craft_x).abs();
                let precision = (PRECISION_BASE - proximity).max(0.0);
                if precision > PRECISION_FLOOR {
                    self.combo = (self.combo + COMBO_STEP).min(COMBO_CAP);
                    self.gate_score += GATE_POINTS * self.combo * f64::from(precision);
                } else {
                    self.combo = 1.0;
                }
                ring.passed = true;
            }
        }

        if self.frame >= DURATION_FRAMES {
            self.finished = true;
        }
    }
}
