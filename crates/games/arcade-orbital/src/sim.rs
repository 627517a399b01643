use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const FRAME_SECS: f32 = 1.0 / 60.0;
pub const DURATION_SECS: f32 = 45.0;
/// 45 seconds at the 60 Hz frame rate.
pub const DURATION_FRAMES: u64 = 2700;

pub const SHIP_START: Vec3 = Vec3::new(0.0, 0.0, 4.0);
const SHIP_LERP: f32 = 0.12;
const STEER_RANGE_X: f32 = 8.0;
const STEER_RANGE_Y: f32 = 4.0;

const INITIAL_ASTEROIDS: usize = 12;
const MAX_ASTEROIDS: usize = 24;
const SPAWN_INTERVAL_SECS: f32 = 1.2;
const DESPAWN_Z: f32 = 10.0;
const COLLISION_RADIUS: f32 = 1.1;

const DODGE_POINTS: f64 = 25.0;
const TIME_POINTS_PER_SEC: f64 = 10.0;
const SURVIVAL_DODGE_BONUS: f64 = 10.0;
const SURVIVAL_TIME_BONUS: f64 = DURATION_SECS as f64 * 1000.0 / 25.0;

#[derive(Debug, Clone)]
pub struct Asteroid {
    pub position: Vec3,
    pub rotation: Vec3,
    speed: f32,
    spin: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Collision,
    Survived,
}

/// Asteroid-field survival sim. The ship chases the steering target with a
/// constant lerp while asteroids stream toward the camera, accelerating as
/// the run goes on. One `step` equals one 60 Hz frame.
pub struct OrbitalSim {
    rng: StdRng,
    pub ship: Vec3,
    target: Vec3,
    pub asteroids: Vec<Asteroid>,
    pub frame: u64,
    pub elapsed: f32,
    since_spawn: f32,
    pub dodged: u32,
    pub outcome: Option<Outcome>,
}

impl OrbitalSim {
    pub fn new(seed: u64) -> Self {
        let mut sim = Self {
            rng: StdRng::seed_from_u64(seed),
            ship: SHIP_START,
            target: SHIP_START,
            asteroids: Vec::new(),
            frame: 0,
            elapsed: 0.0,
            since_spawn: 0.0,
            dodged: 0,
            outcome: None,
        };
        for _ in 0..INITIAL_ASTEROIDS {
            let asteroid = sim.make_asteroid();
            sim.asteroids.push(asteroid);
        }
        sim
    }

    /// Steer toward a normalized pointer position (0..1 on both axes).
    pub fn steer(&mut self, x: f32, y: f32) {
        self.target.x = (x - 0.5) * STEER_RANGE_X;
        self.target.y = (0.5 - y) * STEER_RANGE_Y;
    }

    /// Keyboard steering: nudge the target, clamped to the same volume the
    /// pointer can reach.
    pub fn steer_by(&mut self, dx: f32, dy: f32) {
        let limit_x = STEER_RANGE_X / 2.0;
        let limit_y = STEER_RANGE_Y / 2.0;
        self.target.x = (self.target.x + dx).clamp(-limit_x, limit_x);
        self.target.y = (self.target.y + dy).clamp(-limit_y, limit_y);
    }

    pub fn live_score(&self) -> f64 {
        f64::from(self.dodged) * DODGE_POINTS + f64::from(self.elapsed) * TIME_POINTS_PER_SEC
    }

    /// Score to report once `outcome` is set. Surviving the full sprint
    /// earns a dodge bonus plus a flat time bonus on top of the live score.
    pub fn final_score(&self) -> f64 {
        match self.outcome {
            Some(Outcome::Survived) => {
                self.live_score() + f64::from(self.dodged) * SURVIVAL_DODGE_BONUS + SURVIVAL_TIME_BONUS
            },
            _ => self.live_score(),
        }
    }

    pub fn step(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        // Integer frame count; an accumulated f32 drifts over a full run.
        self.frame += 1;
        self.elapsed = self.frame as f32 * FRAME_SECS;
        self.since_spawn += FRAME_SECS;

        self.ship = self.ship.lerp(self.target, SHIP_LERP);

        let speed_scale = 1.0 + self.elapsed * 0.05;
        for i in 0..self.asteroids.len() {
            self.asteroids[i].position.z += self.asteroids[i].speed * speed_scale;
            let spin = self.asteroids[i].spin;
            self.asteroids[i].rotation += spin;

            if self.asteroids[i].position.z > DESPAWN_Z {
                self.dodged += 1;
                let fresh = self.respawn_position();
                self.asteroids[i].position = fresh;
            }

            if self.asteroids[i].position.distance(self.ship) < COLLISION_RADIUS {
                self.outcome = Some(Outcome::Collision);
                return;
            }
        }

        if self.since_spawn > SPAWN_INTERVAL_SECS && self.asteroids.len() < MAX_ASTEROIDS {
            self.since_spawn = 0.0;
            let asteroid = self.make_asteroid();
            self.asteroids.push(asteroid);
        }

        if self.frame >= DURATION_FRAMES {
            self.outcome = Some(Outcome::Survived);
        }
    }

    fn respawn_position(&mut self) -> Vec3 {
        Vec3::new(
            (self.rng.random::<f32>() - 0.5) * 10.0,
            (self.rng.random::<f32>() - 0.5) * 6.0,
            -30.0 - self.rng.random::<f32>() * 20.0,
        )
    }

    fn make_asteroid(&mut self) -> Asteroid {
        let position = self.respawn_position();
        Asteroid {
            position,
            rotation: Vec3::ZERO,
            speed: 0.18 + self.rng.random::<f32>() * 0.12,
            spin: Vec3::new(
                self.rng.random::<f32>() * 0.02,
                self.rng.random::<f32>() * 0.02,
                self.rng.random::<f32>() * 0.02,
            ),
        }
    }
}
