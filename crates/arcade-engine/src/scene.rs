use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::MeshKind;

/// Handle to a node inside a `Scene`. Stable for the life of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Surface material for a node. Deliberately small: the remote renderer
/// only needs color, glow, and transparency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: f32,
    pub opacity: f32,
}

impl Material {
    pub fn solid(color: [f32; 3]) -> Self {
        Self {
            color,
            emissive: 0.0,
            opacity: 1.0,
        }
    }

    pub fn glowing(color: [f32; 3], emissive: f32) -> Self {
        Self {
            color,
            emissive,
            opacity: 1.0,
        }
    }
}

/// Translation / rotation / scale for a node.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Node payload: an engine primitive, a raw point cloud (star fields), or a
/// point light.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Mesh(MeshKind),
    Points(Vec<[f32; 3]>),
    Light { intensity: f32, range: f32 },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub transform: Transform,
    pub material: Material,
    pub visible: bool,
}

/// Perspective camera.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov_deg: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 8.0),
            look_at: Vec3::ZERO,
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Linear fog matching the backdrop color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

/// A retained scene graph. Games build it once at mount and mutate node
/// transforms per frame; `encode_frame` snapshots it for the remote renderer.
pub struct Scene {
    background: [f32; 3],
    fog: Option<Fog>,
    camera: Camera,
    nodes: Vec<Option<Node>>,
}

impl Scene {
    pub(crate) fn new() -> Self {
        Self {
            background: [0.0, 0.0, 0.0],
            fog: None,
            camera: Camera::default(),
            nodes: Vec::new(),
        }
    }

    pub fn set_background(&mut self, color: [f32; 3]) {
        self.background = color;
    }

    pub fn set_fog(&mut self, fog: Fog) {
        self.fog = Some(fog);
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn add_mesh(&mut self, kind: MeshKind, material: Material) -> NodeId {
        self.add_node(NodeKind::Mesh(kind), material)
    }

    pub fn add_points(&mut self, points: Vec<[f32; 3]>, material: Material) -> NodeId {
        self.add_node(NodeKind::Points(points), material)
    }

    pub fn add_light(&mut self, intensity: f32, range: f32, material: Material) -> NodeId {
        self.add_node(NodeKind::Light { intensity, range }, material)
    }

    fn add_node(&mut self, kind: NodeKind, material: Material) -> NodeId {
        let node = Node {
            kind,
            transform: Transform::default(),
            material,
            visible: true,
        };
        // Reuse the first free slot so NodeIds stay stable across removals.
        if let Some(slot) = self.nodes.iter().position(Option::is_none) {
            self.nodes[slot] = Some(node);
            NodeId(slot)
        } else {
            self.nodes.push(Some(node));
            NodeId(self.nodes.len() - 1)
        }
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Drop every node. Called by engine-backed games during teardown so no
    /// GPU-bound resource outlives the module on the remote renderer.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Snapshot the scene into a serializable frame.
    pub fn encode_frame(&self) -> SceneFrame {
        let nodes = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.visible)
            .map(|n| {
                let (mesh, points, light) = match &n.kind {
                    NodeKind::Mesh(kind) => (Some(*kind), None, None),
                    NodeKind::Points(p) => (None, Some(p.clone()), None),
                    NodeKind::Light { intensity, range } => (None, None, Some([*intensity, *range])),
                };
                NodeFrame {
                    mesh,
                    points,
                    light,
                    matrix: n.transform.matrix().to_cols_array_2d(),
                    color: n.material.color,
                    emissive: n.material.emissive,
                    opacity: n.material.opacity,
                }
            })
            .collect();
        SceneFrame {
            background: self.background,
            fog: self.fog,
            camera: CameraFrame {
                position: self.camera.position.to_array(),
                look_at: self.camera.look_at.to_array(),
                fov_deg: self.camera.fov_deg,
                aspect: self.camera.aspect,
            },
            nodes,
        }
    }
}

/// Serializable snapshot of a scene for the page-side renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFrame {
    pub background: [f32; 3],
    pub fog: Option<Fog>,
    pub camera: CameraFrame,
    pub nodes: Vec<NodeFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraFrame {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov_deg: f32,
    pub aspect: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFrame {
    pub mesh: Option<MeshKind>,
    pub points: Option<Vec<[f32; 3]>>,
    pub light: Option<[f32; 2]>,
    pub matrix: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub emissive: f32,
    pub opacity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_mutate_node() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(MeshKind::Cone, Material::solid([1.0, 0.0, 0.0]));
        scene
            .node_mut(id)
            .expect("node should exist")
            .transform
            .translation = Vec3::new(1.0, 2.0, 3.0);
        let frame = scene.encode_frame();
        assert_eq!(frame.nodes.len(), 1);
        assert_eq!(frame.nodes[0].matrix[3][0], 1.0);
        assert_eq!(frame.nodes[0].matrix[3][1], 2.0);
    }

    #[test]
    fn removed_nodes_leave_frame() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(MeshKind::Torus, Material::solid([1.0, 1.0, 1.0]));
        let b = scene.add_mesh(MeshKind::Cone, Material::solid([1.0, 1.0, 1.0]));
        scene.remove(a);
        assert_eq!(scene.node_count(), 1);
        assert!(scene.node(a).is_none());
        assert!(scene.node(b).is_some());
    }

    #[test]
    fn node_slots_are_reused() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(MeshKind::Cone, Material::solid([1.0, 1.0, 1.0]));
        scene.remove(a);
        let b = scene.add_mesh(MeshKind::Torus, Material::solid([1.0, 1.0, 1.0]));
        assert_eq!(a, b, "freed slot should be reused");
    }

    #[test]
    fn invisible_nodes_are_not_encoded() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(MeshKind::Grid, Material::solid([0.5, 0.5, 0.5]));
        scene.node_mut(id).expect("node should exist").visible = false;
        assert!(scene.encode_frame().nodes.is_empty());
    }

    #[test]
    fn clear_empties_the_graph() {
        let mut scene = Scene::new();
        scene.add_mesh(MeshKind::Cone, Material::solid([1.0, 1.0, 1.0]));
        scene.add_points(vec![[0.0; 3]; 10], Material::solid([1.0, 1.0, 1.0]));
        scene.clear();
        assert_eq!(scene.node_count(), 0);
    }
}
