use std::collections::HashMap;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::EngineBootError;

/// The closed set of primitive meshes the engine ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshKind {
    /// Pointed hull used for the orbital ship.
    Cone,
    /// Rough asteroid body.
    Icosahedron,
    /// Energy ring / gate.
    Torus,
    /// Tapered hovercraft hull.
    Cylinder,
    /// Half-sphere canopy.
    SphereCap,
    /// Flat track grid rendered as line segments.
    Grid,
}

impl MeshKind {
    pub const ALL: &[MeshKind] = &[
        MeshKind::Cone,
        MeshKind::Icosahedron,
        MeshKind::Torus,
        MeshKind::Cylinder,
        MeshKind::SphereCap,
        MeshKind::Grid,
    ];
}

/// Raw vertex data for a unit-scale primitive. Grids are line lists
/// (indices come in pairs); everything else is a triangle list.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Prebuilt geometry table, populated once at engine boot.
pub struct MeshLibrary {
    meshes: HashMap<MeshKind, MeshData>,
}

impl MeshLibrary {
    pub(crate) fn empty() -> Self {
        Self {
            meshes: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, kind: MeshKind, mesh: MeshData) {
        self.meshes.insert(kind, mesh);
    }

    /// Panics only if called for a kind that was never built, which cannot
    /// happen for an engine constructed through `RenderEngine::boot`.
    pub(crate) fn get(&self, kind: MeshKind) -> &MeshData {
        self.meshes
            .get(&kind)
            .unwrap_or_else(|| unreachable!("mesh library missing {kind:?}"))
    }
}

/// Build the unit-scale mesh for a primitive kind.
pub fn build_mesh(kind: MeshKind) -> MeshData {
    match kind {
        MeshKind::Cone => cone(1.0, 2.0, 16),
        MeshKind::Icosahedron => icosahedron(1.0),
        MeshKind::Torus => torus(1.0, 0.0625, 12, 48),
        MeshKind::Cylinder => cylinder(0.5, 1.0, 1.5, 24),
        MeshKind::SphereCap => sphere_cap(1.0, 24, 16),
        MeshKind::Grid => grid(20.0, 20),
    }
}

/// Reject degenerate or non-finite geometry before it enters the library.
pub fn validate_mesh(kind: MeshKind, mesh: &MeshData) -> Result<(), EngineBootError> {
    if mesh.positions.is_empty() || mesh.indices.is_empty() {
        return Err(EngineBootError::InvalidGeometry {
            mesh: kind,
            reason: "empty vertex or index buffer".to_string(),
        });
    }
    for p in &mesh.positions {
        if !p.iter().all(|c| c.is_finite()) {
            return Err(EngineBootError::InvalidGeometry {
                mesh: kind,
                reason: "non-finite vertex position".to_string(),
            });
        }
    }
    let max = mesh.positions.len() as u32;
    if mesh.indices.iter().any(|&i| i >= max) {
        return Err(EngineBootError::InvalidGeometry {
            mesh: kind,
            reason: "index out of bounds".to_string(),
        });
    }
    Ok(())
}

fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    let mut positions = vec![[0.0, height / 2.0, 0.0], [0.0, -height / 2.0, 0.0]];
    for i in 0..segments {
        let a = i as f32 / segments as f32 * 2.0 * PI;
        positions.push([radius * a.cos(), -height / 2.0, radius * a.sin()]);
    }
    let mut indices = Vec::new();
    for i in 0..segments {
        let cur = 2 + i;
        let next = 2 + (i + 1) % segments;
        // Side, then base.
        indices.extend([0, cur, next]);
        indices.extend([1, next, cur]);
    }
    MeshData { positions, indices }
}

fn icosahedron(radius: f32) -> MeshData {
    // Golden-ratio construction of the 12 vertices.
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let raw: [[f32; 3]; 12] = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let scale = radius / (1.0 + t * t).sqrt();
    let positions = raw
        .iter()
        .map(|p| [p[0] * scale, p[1] * scale, p[2] * scale])
        .collect();
    let indices = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];
    MeshData { positions, indices }
}

fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> MeshData {
    let mut positions = Vec::new();
    for j in 0..radial {
        for i in 0..tubular {
            let u = i as f32 / tubular as f32 * 2.0 * PI;
            let v = j as f32 / radial as f32 * 2.0 * PI;
            positions.push([
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ]);
        }
    }
    let mut indices = Vec::new();
    for j in 0..radial {
        for i in 0..tubular {
            let a = j * tubular + i;
            let b = ((j + 1) % radial) * tubular + i;
            let c = ((j + 1) % radial) * tubular + (i + 1) % tubular;
            let d = j * tubular + (i + 1) % tubular;
            indices.extend([a, b, d]);
            indices.extend([b, c, d]);
        }
    }
    MeshData { positions, indices }
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let mut positions = Vec::new();
    for i in 0..segments {
        let a = i as f32 / segments as f32 * 2.0 * PI;
        positions.push([radius_top * a.cos(), height / 2.0, radius_top * a.sin()]);
        positions.push([
            radius_bottom * a.cos(),
            -height / 2.0,
            radius_bottom * a.sin(),
        ]);
    }
    let mut indices = Vec::new();
    for i in 0..segments {
        let a = i * 2;
        let b = i * 2 + 1;
        let c = ((i + 1) % segments) * 2;
        let d = ((i + 1) % segments) * 2 + 1;
        indices.extend([a, b, c]);
        indices.extend([b, d, c]);
    }
    MeshData { positions, indices }
}

fn sphere_cap(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut positions = Vec::new();
    for j in 0..=height_segments {
        // Upper hemisphere only.
        let phi = j as f32 / height_segments as f32 * PI / 2.0;
        for i in 0..=width_segments {
            let theta = i as f32 / width_segments as f32 * 2.0 * PI;
            positions.push([
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ]);
        }
    }
    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for j in 0..height_segments {
        for i in 0..width_segments {
            let a = j * stride + i;
            let b = (j + 1) * stride + i;
            let c = (j + 1) * stride + i + 1;
            let d = j * stride + i + 1;
            indices.extend([a, b, d]);
            indices.extend([b, c, d]);
        }
    }
    MeshData { positions, indices }
}

fn grid(size: f32, divisions: u32) -> MeshData {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        let base = positions.len() as u32;
        positions.push([-half, 0.0, offset]);
        positions.push([half, 0.0, offset]);
        positions.push([offset, 0.0, -half]);
        positions.push([offset, 0.0, half]);
        indices.extend([base, base + 1, base + 2, base + 3]);
    }
    MeshData { positions, indices }
}
