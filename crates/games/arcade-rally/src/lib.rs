pub mod sim;

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::{Quat, Vec3};

use arcade_core::cleanup::{CleanupHandle, ResourceBag};
use arcade_core::game::{GameContext, GameMetadata, GameModule};
use arcade_core::input::{InputEvent, KeyCode};
use arcade_core::registry::GameKey;
use arcade_core::surface::FramePacket;
use arcade_core::theme::{ThemeColors, ThemeRole};
use arcade_engine::geometry::MeshKind;
use arcade_engine::scene::{Fog, Material, NodeId, Scene};

use sim::RallySim;

const FRAME: Duration = Duration::from_millis(16);
/// Sideways nudge per frame while a steering key is held.
const KEY_STEER: f32 = 0.15;

/// Holo Rally: a minute of threading energy gates for combo points.
pub struct HoloRally {
    seed: u64,
}

impl HoloRally {
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for HoloRally {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModule for HoloRally {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            key: GameKey::Rally,
            title: "Holo Rally",
            blurb: "Drift through glowing gates. Center hits build a combo, rim clips break it.",
            estimated_duration: Duration::from_secs(60),
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
            tracing::warn!(error = %err, "engine unavailable, scoring round as zero");
            ctx.reporter.report(0.0);
            return;
        },
    };

    let mut sim = RallySim::new(seed);
    let mut scene = engine.create_scene();
    let view = build_scene(&mut scene, &sim, &ctx.theme);

    let mut interval = tokio::time::interval(FRAME);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut held_left = false;
    let mut held_right = false;

    loop {
        interval.tick().await;

        while let Some(event) = ctx.input.try_next() {
            match event {
                InputEvent::PointerMove { x, .. } | InputEvent::PointerDown { x, .. } => {
                    sim.steer(x);
                },
                InputEvent::Key { code, pressed } => match code {
                    KeyCode::ArrowLeft | KeyCode::KeyA => held_left = pressed,
                    KeyCode::ArrowRight | KeyCode::KeyD => held_right = pressed,
                    _ => {},
                },
                _ => {},
            }
        }
        if held_left {
            sim.steer_by(-KEY_STEER);
        }
        if held_right {
            sim.steer_by(KEY_STEER);
        }

        sim.step();
        sync_scene(&mut scene, &view, &sim);
        scene.camera_mut().aspect = ctx.surface.size().aspect();
        ctx.surface.present(FramePacket::Scene(scene.encode_frame()));

        if sim.finished {
            let score = sim.final_score();
            tracing::debug!(score, combo = sim.combo, "rally finished");
            ctx.reporter.report(score);
            scene.clear();
            ctx.surface.present(FramePacket::Scene(scene.encode_frame()));
            return;
        }
    }
}

struct SceneView {
    hull: NodeId,
    canopy: NodeId,
    track: NodeId,
    rings: Vec<NodeId>,
}

fn build_scene(scene: &mut Scene, sim: &RallySim, theme: &ThemeColors) -> SceneView {
    let bg = theme.rgb(ThemeRole::Background);
    scene.set_background(bg);
    scene.set_fog(Fog {
        color: bg,
        near: 8.0,
        far: 40.0,
    });
    {
        let camera = scene.camera_mut();
        camera.position = Vec3::new(0.0, 2.6, 6.0);
        camera.fov_deg = 62.0;
    }

    let back = scene.add_light(1.2, 60.0, Material::solid(theme.rgb(ThemeRole::Accent)));
    if let Some(node) = scene.node_mut(back) {
        node.transform.translation = Vec3::new(0.0, 10.0, -15.0);
    }
    let side = scene.add_light(0.8, 60.0, Material::solid(theme.rgb(ThemeRole::Secondary)));
    if let Some(node) = scene.node_mut(side) {
        node.transform.translation = Vec3::new(-6.0, 4.0, 10.0);
    }

    let hull = scene.add_mesh(
        MeshKind::Cylinder,
        Material::glowing(theme.rgb(ThemeRole::Accent), 0.25),
    );
    if let Some(node) = scene.node_mut(hull) {
        node.transform.scale = Vec3::new(0.8, 1.2, 0.8);
        node.transform.rotation = Quat::from_rotation_x(FRAC_PI_2);
    }
    let canopy = scene.add_mesh(
        MeshKind::SphereCap,
        Material {
            color: theme.rgb(ThemeRole::Text),
            emissive: 0.15,
            opacity: 0.8,
        },
    );
    if let Some(node) = scene.node_mut(canopy) {
        node.transform.scale = Vec3::splat(0.45);
    }

    let track = scene.add_mesh(
        MeshKind::Grid,
        Material::glowing(theme.rgb(ThemeRole::Accent), 0.4),
    );
    if let Some(node) = scene.node_mut(track) {
        node.transform.translation = Vec3::new(0.0, -1.2, 0.0);
        node.transform.scale = Vec3::splat(20.0);
    }

    let ring_material = Material::glowing(theme.rgb(ThemeRole::Secondary), 0.5);
    let rings = sim
        .rings
        .iter()
        .map(|_| {
            let id = scene.add_mesh(MeshKind::Torus, ring_material);
            if let Some(node) = scene.node_mut(id) {
                node.transform.scale = Vec3::splat(1.6);
            }
            id
        })
        .collect();

    SceneView {
        hull,
        canopy,
        track,
        rings,
    }
}

fn sync_scene(scene: &mut Scene, view: &SceneView, sim: &RallySim) {
    let craft = Vec3::new(sim.craft_x, 0.0, sim::CRAFT_Z);
    let bank = Quat::from_rotation_z(sim.craft_x * -0.08);
    if let Some(node) = scene.node_mut(view.hull) {
        node.transform.translation = craft;
        node.transform.rotation = bank * Quat::from_rotation_x(FRAC_PI_2);
    }
    if let Some(node) = scene.node_mut(view.canopy) {
        node.transform.translation = craft + Vec3::new(0.0, 0.25, 0.05);
        node.transform.rotation = bank;
    }
    if let Some(node) = scene.node_mut(view.track) {
        // Scroll the grid with elapsed distance for a sense of speed.
        node.transform.translation.z = (sim.distance as f32 * -2.0) % 6.0;
    }
    for (id, ring) in view.rings.iter().zip(&sim.rings) {
        if let Some(node) = scene.node_mut(*id) {
            node.transform.translation = ring.position;
            node.transform.rotation =
                Quat::from_euler(glam::EulerRot::XYZ, ring.rotation.x, ring.rotation.y, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::make_context;

    #[tokio::test(start_paused = true)]
    async fn full_run_reports_final_score() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(HoloRally::seeded(33)).start(ctx);

        let mut saw_scene = false;
        while let Some(packet) = harness.frames.recv().await {
            if matches!(packet, FramePacket::Scene(_)) {
                saw_scene = true;
            }
        }
        assert!(saw_scene);

        let score = harness.receipt.recv().await.expect("run must resolve");
        // Distance alone guarantees a positive score over a full minute.
        assert!(score > 0.0);
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn arrow_key_steers_the_craft() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(HoloRally::seeded(33)).start(ctx);

        harness.input.dispatch(InputEvent::Key {
            code: KeyCode::ArrowRight,
            pressed: true,
        });

        // The hull is the only cylinder in the scene; track its x.
        let mut hull_x = 0.0_f32;
        while let Some(packet) = harness.frames.recv().await {
            if let FramePacket::Scene(frame) = packet {
                for node in &frame.nodes {
                    if node.mesh == Some(MeshKind::Cylinder) {
                        hull_x = node.matrix[3][0];
                    }
                }
            }
        }
        assert!(hull_x > 2.0, "held arrow key should carry the craft right");
        assert!(harness.receipt.recv().await.is_some());
        cleanup.invoke();
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_mid_run_reports_nothing() {
        let (ctx, mut harness) = make_context();
        let cleanup = Box::new(HoloRally::seeded(33)).start(ctx);

        for _ in 0..3 {
            harness.frames.recv().await;
        }
        cleanup.invoke();
        while harness.frames.recv().await.is_some() {}
        assert_eq!(harness.receipt.recv().await, None);
    }

    #[test]
    fn metadata_requires_engine() {
        let meta = HoloRally::new().metadata();
        assert_eq!(meta.key, GameKey::Rally);
        assert!(meta.requires_engine);
    }
}
