use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const WIDTH: f32 = 640.0;
pub const HEIGHT: f32 = 260.0;
pub const GROUND_MARGIN: f32 = 12.0;

pub const PLAYER_X: f32 = 60.0;
pub const PLAYER_WIDTH: f32 = 36.0;
pub const PLAYER_HEIGHT: f32 = 48.0;

const GRAVITY: f32 = 0.9;
const JUMP_FORCE: f32 = -15.0;
const SCROLL_SPEED: f32 = 6.0;
const SPAWN_INTERVAL: u32 = 80;
const DODGE_POINTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn top(&self) -> f32 {
        HEIGHT - self.height - GROUND_MARGIN
    }
}

/// Per-frame runner simulation: constant-speed ground scroll, one jump
/// arc, rectangular obstacle collision. One `step` equals one rendered
/// frame at the nominal 60 Hz rate.
pub struct JumpSim {
    rng: StdRng,
    pub player_y: f32,
    velocity_y: f32,
    jumping: bool,
    pub obstacles: Vec<Obstacle>,
    spawn_timer: u32,
    pub score: u32,
    pub crashed: bool,
}

impl JumpSim {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            player_y: HEIGHT - PLAYER_HEIGHT - GROUND_MARGIN,
            velocity_y: 0.0,
            jumping: false,
            obstacles: Vec::new(),
            spawn_timer: 0,
            score: 0,
            crashed: false,
        }
    }

    /// Launch a jump if grounded; mid-air presses are ignored.
    pub fn jump(&mut self) {
        if !self.jumping {
            self.velocity_y = JUMP_FORCE;
            self.jumping = true;
        }
    }

    pub fn is_grounded(&self) -> bool {
        !self.jumping
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        if self.crashed {
            return;
        }

        self.player_y += self.velocity_y;
        self.velocity_y += GRAVITY;

        let ground = HEIGHT - PLAYER_HEIGHT - GROUND_MARGIN;
        if self.player_y >= ground {
            self.player_y = ground;
            self.velocity_y = 0.0;
            self.jumping = false;
        }

        self.spawn_timer += 1;
        if self.spawn_timer > SPAWN_INTERVAL {
            self.spawn_obstacle();
            self.spawn_timer = 0;
        }

        let mut crashed = false;
        let player_bottom = self.player_y + PLAYER_HEIGHT;
        for obstacle in &mut self.obstacles {
            obstacle.x -= SCROLL_SPEED;
            if PLAYER_X < obstacle.x + obstacle.width
                && PLAYER_X + PLAYER_WIDTH > obstacle.x
                && player_bottom > obstacle.top()
            {
                crashed = true;
            }
        }
        if !crashed {
            let before = self.obstacles.len();
            // An obstacle whose right edge reaches x=0 is fully off-screen.
            self.obstacles.retain(|o| o.x + o.width > 0.0);
            self.score += (before - self.obstacles.len()) as u32 * DODGE_POINTS;
        }
        self.crashed = crashed;
    }

    fn spawn_obstacle(&mut self) {
        let obstacle = Obstacle {
            x: WIDTH + self.rng.random_range(0.0..120.0),
            width: 30.0 + self.rng.random_range(0.0..20.0),
            height: 40.0 + self.rng.random_range(0.0..20.0),
        };
        self.obstacles.push(obstacle);
    }
}
