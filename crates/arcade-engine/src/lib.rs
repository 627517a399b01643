pub mod geometry;
pub mod scene;

use thiserror::Error;

use geometry::{MeshData, MeshKind, MeshLibrary};
use scene::Scene;

/// Errors raised while booting the render engine.
#[derive(Debug, Error)]
pub enum EngineBootError {
    #[error("invalid geometry in {mesh:?}: {reason}")]
    InvalidGeometry { mesh: MeshKind, reason: String },
    #[error("engine boot interrupted: {0}")]
    Interrupted(String),
}

/// The shared 3D engine. Booting builds the full procedural mesh library,
/// which is the expensive part; once booted the engine is immutable and
/// cheap to share behind an `Arc`.
pub struct RenderEngine {
    library: MeshLibrary,
}

impl RenderEngine {
    /// Build the engine. Yields between mesh builds so a long boot does not
    /// monopolize the runtime.
    pub async fn boot() -> Result<Self, EngineBootError> {
        let mut library = MeshLibrary::empty();
        for kind in MeshKind::ALL {
            let mesh = geometry::build_mesh(*kind);
            geometry::validate_mesh(*kind, &mesh)?;
            library.insert(*kind, mesh);
            tokio::task::yield_now().await;
        }
        tracing::debug!(meshes = MeshKind::ALL.len(), "render engine booted");
        Ok(Self { library })
    }

    /// Start a new empty scene bound to this engine's mesh library.
    pub fn create_scene(&self) -> Scene {
        Scene::new()
    }

    /// Look up prebuilt geometry for a mesh kind.
    pub fn mesh(&self, kind: MeshKind) -> &MeshData {
        self.library.get(kind)
    }
}
