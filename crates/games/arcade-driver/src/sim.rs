use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const WIDTH: f32 = 420.0;
pub const HEIGHT: f32 = 320.0;

pub const CAR_WIDTH: f32 = 40.0;
pub const CAR_HEIGHT: f32 = 60.0;
pub const CAR_Y: f32 = HEIGHT - 80.0;

const CAR_SPEED: f32 = 6.0;
const EDGE_MARGIN: f32 = 10.0;
const LANES: u32 = 4;
const SPAWN_INTERVAL: u64 = 50;
const DODGE_POINTS: f64 = 12.0;
const SURVIVAL_POINTS: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct Traffic {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    speed: f32,
}

/// Which way the car is being steered this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Steering {
    pub left: bool,
    pub right: bool,
}

/// Top-down traffic dodger: four spawn lanes, traffic accelerates with
/// elapsed frames, score drips per frame survived plus a bonus per block
/// that scrolls past.
pub struct DriverSim {
    rng: StdRng,
    pub car_x: f32,
    pub traffic: Vec<Traffic>,
    pub frame: u64,
    pub score: f64,
    pub crashed: bool,
    pub steering: Steering,
}

impl DriverSim {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            car_x: WIDTH / 2.0 - CAR_WIDTH / 2.0,
            traffic: Vec::new(),
            frame: 0,
            score: 0.0,
            crashed: false,
            steering: Steering::default(),
        }
    }

    /// Pointer steering puts the car center under the given x.
    pub fn steer_to(&mut self, x: f32) {
        self.car_x = clamp_car(x - CAR_WIDTH / 2.0);
    }

    pub fn rounded_score(&self) -> u32 {
        self.score.round().max(0.0) as u32
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        if self.crashed {
            return;
        }

        if self.steering.left {
            self.car_x -= CAR_SPEED;
        }
        if self.steering.right {
            self.car_x += CAR_SPEED;
        }
        self.car_x = clamp_car(self.car_x);

        self.frame += 1;
        if self.frame % SPAWN_INTERVAL == 0 {
            self.spawn_traffic();
        }

        let drift = self.frame as f32 / 600.0;
        for block in &mut self.traffic {
            block.y += block.speed + drift;
            if overlaps(self.car_x, CAR_Y, block) {
                self.crashed = true;
                return;
            }
        }

        let before = self.traffic.len();
        self.traffic.retain(|b| b.y <= HEIGHT + 80.0);
        self.score += (before - self.traffic.len()) as f64 * DODGE_POINTS;

        self.score += SURVIVAL_POINTS;
    }

    fn spawn_traffic(&mut self) {
        let lane_width = WIDTH / LANES as f32;
        let lane = self.rng.random_range(0..LANES) as f32;
        self.traffic.push(Traffic {
            x: lane * lane_width + lane_width / 2.0 - 25.0,
            y: -70.0,
            width: 50.0,
            height: 70.0,
            speed: 4.0 + self.rng.random_range(0.0..2.0),
        });
    }
}

fn clamp_car(x: f32) -> f32 {
    x.clamp(EDGE_MARGIN, WIDTH - CAR_WIDTH - EDGE_MARGIN)
}

fn overlaps(car_x: f32, car_y: f32, block: &Traffic) -> bool {
    car_x < block.x + block.width
        && car_x + CAR_WIDTH > block.x
        && car_y < block.y + block.height
        && car_y + CAR_HEIGHT > block.y
}
