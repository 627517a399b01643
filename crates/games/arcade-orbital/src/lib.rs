pub mod sim;

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::{Quat, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use arcade_core::cleanup::{CleanupHandle, ResourceBag};
use arcade_core::game::{GameContext, GameMetadata, GameModule};
use arcade_core::input::{InputEvent, KeyCode};
use arcade_core::registry::GameKey;
use arcade_core::surface::FramePacket;
use arcade_core::theme::{ThemeColors, ThemeRole};
use arcade_engine::geometry::MeshKind;
use arcade_engine::scene::{Fog, Material, NodeId, Scene};

use sim::OrbitalSim;

const FRAME: Duration = Duration::from_millis(16);
const STAR_COUNT: usize = 700;
/// Steering nudge per frame while a direction key is held.
const KEY_STEER: f32 = 0.15;

#[derive(Default)]
struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

/// Orbital Sprint: 45 seconds of asteroid dodging in the shared 3D engine.
pub struct OrbitalSprint {
    seed: u64,
}

impl OrbitalSprint {
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for OrbitalSprint {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModule for OrbitalSprint {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            key: GameKey::Orbital,
            title: "Orbital Sprint",
            blurb: "Steer the ship through a thickening asteroid field for 45 seconds.",
            estimated_duration: Duration::from_secs(45),
            requires_engine: true,
        }
    }

    fn start(self: Box<Self>, ctx: GameContext) -> CleanupHandle {
        let mut bag = ResourceBag::new();
        bag.register_task(tokio::spawn(run(self.seed, ctx)));
        bag.into_handle()
    }
}

async fn run(seed: u64, mut ctx: GameContext) {
    let engine = match ctx.engine.ensure_loaded().await {
        Ok(engine) => engine,
        Err(err) => {
            // The round still resolves so the session can move on.
            tracing::warn!(error = %err, "engine unavailable, scoring round as zero");
            ctx.reporter.report(0.0);
            return;
        },
    };

    let mut sim = OrbitalSim::new(seed);
    let mut scene = engine.create_scene();
    let mut view = build_scene(&mut scene, &sim, seed, &ctx.theme);

    let mut interval = tokio::time::interval(FRAME);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut held = HeldKeys::default();

    loop {
        interval.tick().await;

        while let Some(event) = ctx.input.try_next() {
            match event {
                InputEvent::PointerMove { x, y } | InputEvent::PointerDown { x, y } => {
                    sim.steer(x, y);
                },
                InputEvent::Key { code, pressed } => match code {
                    KeyCode::ArrowLeft | KeyCode::KeyA => held.left = pressed,
                    KeyCode::ArrowRight | KeyCode::KeyD => held.right = pressed,
                    KeyCode::ArrowUp | KeyCode::KeyW => held.up = pressed,
                    KeyCode::ArrowDown | KeyCode::KeyS => held.down = pressed,
                    _ => {},
                },
                _ => {},
            }
        }
        let mut dx = 0.0;
        let mut dy = 0.0;
        if held.left {
            dx -= KEY_STEER;
        }
        if held.right {
            dx += KEY_STEER;
        }
        if held.up {
            dy += KEY_STEER;
        }
        if held.down {
            dy -= KEY_STEER;
        }
        if dx != 0.0 || dy != 0.0 {
            sim.steer_by(dx, dy);
        }

        sim.step();
        sync_scene(&mut scene, &mut view, &sim);
        scene.camera_mut().aspect = ctx.surface.size().aspect();
        ctx.surface.present(FramePacket::Scene(scene.encode_frame()));

        if let Some(outcome) = sim.outcome {
            let score = sim.final_score();
            tracing::debug!(?outcome, score, dodged = sim.dodged, "sprint finished");
            ctx.reporter.report(score);
            scene.clear();
            ctx.surface.present(FramePacket::Scene(scene.encode_frame()));
            return;
        }
    }
}

struct SceneView {
    ship: NodeId,
    stars: NodeId,
    asteroids: Vec<NodeId>,
    asteroid_material: Material,
}

fn build_scene(scene: &mut Scene, sim: &OrbitalSim, seed: u64, theme: &ThemeColors) -> SceneView {
    let bg = theme.rgb(ThemeRole::Background);
    scene.set_background(bg);
    scene.set_fog(Fog {
        color: bg,
        near: 6.0,
        far: 30.0,
    });

    let key = scene.add_light(1.2, 40.0, Material::solid(theme.rgb(ThemeRole::Accent)));
    if let Some(node) = scene.node_mut(key) {
        node.transform.translation = Vec3::new(5.0, 5.0, 10.0);
    }
    let fill = scene.add_light(0.6, 35.0, Material::solid(theme.rgb(ThemeRole::Secondary)));
    if let Some(node) = scene.node_mut(fill) {
        node.transform.translation = Vec3::new(-6.0, -2.0, 8.0);
    }

    let ship = scene.add_mesh(
        MeshKind::Cone,
        Material::glowing(theme.rgb(ThemeRole::Accent), 0.3),
    );
    if let Some(node) = scene.node_mut(ship) {
        node.transform.scale = Vec3::new(0.6, 2.2, 0.6);
    }

    let mut star_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let stars_points: Vec<[f32; 3]> = (0..STAR_COUNT)
        .map(|_| {
            [
                (star_rng.random::<f32>() - 0.5) * 40.0,
                (star_rng.random::<f32>() - 0.5) * 30.0,
                -star_rng.random::<f32>() * 40.0,
            ]
        })
        .collect();
    let stars = scene.add_points(stars_points, Material::glowing(theme.rgb(ThemeRole::Text), 0.9));

    let asteroid_material = Material::solid(theme.rgb(ThemeRole::Secondary));
    let asteroids = sim
        .asteroids
        .iter()
        .map(|_| scene.add_mesh(MeshKind::Icosahedron, asteroid_material))
        .collect();

    SceneView {
        ship,
        stars,
        asteroids,
        asteroid_material,
    }
}

fn sync_scene(scene: &mut Scene, view: &mut SceneView, sim: &OrbitalSim) {
    // Late spawns get a node on first sight.
    while view.asteroids.len() < sim.asteroids.len() {
        view.asteroids
            .push(scene.add_mesh(MeshKind::Icosahedron, view.asteroid_material));
    }

    if let Some(node) = scene.node_mut(view.ship) {
        node.transform.translation = sim.ship;
        node.transform.rotation = Quat::from_rotation_x(FRAC_PI_2)
            * Quat::from_rotation_z(sim.ship.x * -0.08)
            * Quat::from_rotation_y(sim.ship.x * 0.03);
    }
    if let Some(node) = scene.node_mut(view.stars) {
        node.transform.rotation *= Quat::from_rotation_z(0.0008);
    }
    for (i, asteroid) in sim.asteroids.iter().enumerate() {
        let id = match view.asteroids.get(i) {
            Some(id) => *id,
            None => continue,
        };
        if let Some(node) = scene.node_mut(id) {
            node.transform.translation = asteroid.position;
            node.transform.rotation = Quat::from_euler(
                glam::EulerRot::XYZ,
                asteroid.rotation.x,
                asteroid.rotation.y,
                asteroid.rotation.z,
            );
            node.transform.scale = Vec3::splat(0.7);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::make_context;

    #[tokio::test(start_paused = true)]
    async fn full_sprint_reports_once() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(OrbitalSprint::seeded(21)).start(ctx);

        let mut scene_frames = 0;
        while let Some(packet) = harness.frames.recv().await {
            if matches!(packet, FramePacket::Scene(_)) {
                scene_frames += 1;
            }
        }
        assert!(scene_frames > 0, "an engine game presents scene frames");

        let score = harness.receipt.recv().await.expect("round must resolve");
        assert!(score >= 0.0);
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn arrow_key_steers_the_ship() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(OrbitalSprint::seeded(21)).start(ctx);

        harness.input.dispatch(InputEvent::Key {
            code: KeyCode::ArrowRight,
            pressed: true,
        });

        // The ship is the only cone in the scene; track how far right it gets.
        let mut max_ship_x = 0.0_f32;
        while let Some(packet) = harness.frames.recv().await {
            if let FramePacket::Scene(frame) = packet {
                for node in &frame.nodes {
                    if node.mesh == Some(MeshKind::Cone) {
                        max_ship_x = max_ship_x.max(node.matrix[3][0]);
                    }
                }
            }
        }
        assert!(max_ship_x > 1.0, "held arrow key should carry the ship right");
        assert!(harness.receipt.recv().await.is_some());
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn final_frame_is_an_empty_scene() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(OrbitalSprint::seeded(21)).start(ctx);

        let mut last_scene = None;
        while let Some(packet) = harness.frames.recv().await {
            if let FramePacket::Scene(frame) = packet {
                last_scene = Some(frame);
            }
        }
        let last = last_scene.expect("at least one scene frame");
        assert!(last.nodes.is_empty(), "teardown clears every node");
        cleanup.invoke();
    }

    #[test]
    fn metadata_requires_engine() {
        let meta = OrbitalSprint::new().metadata();
        assert_eq!(meta.key, GameKey::Orbital);
        assert!(meta.requires_engine);
    }
}
