//! Two-sided triangulated shells.

use super::object::MeshData;
use super::Vec3;
use crate::error::{ArchitectError, Result};
use crate::types::BlockPosition;
use serde::{Deserialize, Serialize};

/// A shell with the same vertex/triangle layout as [`Object3`](super::Object3),
/// but not filled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "MeshData", into = "MeshData")]
pub struct Surface {
    mesh: MeshData,
}

impl Surface {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        Self::try_from(MeshData {
            vertices,
            triangles,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.mesh.vertices
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.mesh.triangles
    }

    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.mesh.bounds()
    }

    /// Shell rasterization has no defined fill rule yet.
    pub fn blocks(&self) -> Result<Vec<BlockPosition>> {
        Err(ArchitectError::Unsupported(
            "surface rasterization".to_string(),
        ))
    }
}

impl TryFrom<MeshData> for Surface {
    type Error = ArchitectError;

    fn try_from(mesh: MeshData) -> Result<Self> {
        mesh.validate()?;
        Ok(Self { mesh })
    }
}

impl From<Surface> for MeshData {
    fn from(value: Surface) -> Self {
        value.mesh
    }
}
