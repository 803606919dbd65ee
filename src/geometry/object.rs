//! Triangulated solids and their voxelization.

use super::{Quaternion, Ray, Vec3};
use crate::error::{ArchitectError, Result};
use crate::types::{BlockPosition, Direction};
use serde::{Deserialize, Serialize};

/// How ray crossings decide whether a point is inside a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Any crossing counts as inside. Exact for convex solids only.
    #[default]
    AnyHit,
    /// Odd number of distinct crossings.
    Parity,
}

/// Vertex and triangle lists as they appear in JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[usize; 3]>,
}

impl MeshData {
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            if let Some(index) = triangle.iter().find(|index| **index >= count) {
                return Err(ArchitectError::InvalidGeometry(format!(
                    "triangle {} references vertex {} but only {} vertices exist",
                    i, index, count
                )));
            }
        }
        Ok(())
    }

    /// Component-wise min and max of all vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }

    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }
}

/// A closed triangulated solid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "MeshData", into = "MeshData")]
pub struct Object3 {
    mesh: MeshData,
}

impl Object3 {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        Self::try_from(MeshData {
            vertices,
            triangles,
        })
    }

    /// Axis-aligned box between two corners, twelve triangles.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let (lo, hi) = (min.min(max), min.max(max));
        let vertices = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { lo.x } else { hi.x },
                    if i & 2 == 0 { lo.y } else { hi.y },
                    if i & 4 == 0 { lo.z } else { hi.z },
                )
            })
            .collect();
        let quads = [
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 1, 3, 2],
            [4, 5, 7, 6],
            [0, 2, 6, 4],
            [1, 3, 7, 5],
        ];
        let triangles = quads
            .iter()
            .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
            .collect();
        Self {
            mesh: MeshData {
                vertices,
                triangles,
            },
        }
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

    /// The solid rotated about `pivot`.
    pub fn rotated(&self, rotation: Quaternion, pivot: Vec3) -> Self {
        let vertices = self
            .mesh
            .vertices
            .iter()
            .map(|v| pivot + rotation.rotate_vector(*v - pivot))
            .collect();
        Self {
            mesh: MeshData {
                vertices,
                triangles: self.mesh.triangles.clone(),
            },
        }
    }

    /// Turn north-facing geometry to `direction` about its bounding box center.
    pub fn facing(&self, direction: Direction) -> Self {
        match self.bounds() {
            Some((min, max)) => self.rotated(direction.rotation(), (min + max) / 2.0),
            None => self.clone(),
        }
    }

    /// Whether `point` is inside, casting a ray straight up.
    pub fn contains(&self, point: Vec3, mode: ContainmentMode) -> bool {
        let ray = Ray::up(point);
        let mut hits = (0..self.mesh.triangles.len())
            .filter_map(|i| {
                let [a, b, c] = self.mesh.triangle(i);
                ray.triangle_hit(a, b, c)
            });

        match mode {
            ContainmentMode::AnyHit => hits.next().is_some(),
            ContainmentMode::Parity => {
                let mut distances: Vec<f64> = hits.collect();
                distances.sort_by(f64::total_cmp);
                // a crossing through a shared edge is reported by both triangles
                distances.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
                distances.len() % 2 == 1
            }
        }
    }

    /// Cells of the bounding box whose center lies inside the solid.
    pub fn blocks(&self, mode: ContainmentMode) -> Vec<BlockPosition> {
        let Some((min, max)) = self.bounds() else {
            return Vec::new();
        };
        let (lo, hi) = (min.floor(), max.ceil());

        let mut blocks = Vec::new();
        for x in lo.x as i32..hi.x as i32 {
            for y in lo.y as i32..hi.y as i32 {
                for z in lo.z as i32..hi.z as i32 {
                    let pos = BlockPosition::new(x, y, z);
                    if self.contains(pos.center(), mode) {
                        blocks.push(pos);
                    }
                }
            }
        }
        blocks
    }
}

impl TryFrom<MeshData> for Object3 {
    type Error = ArchitectError;

    fn try_from(mesh: MeshData) -> Result<Self> {
        mesh.validate()?;
        Ok(Self { mesh })
    }
}

impl From<Object3> for MeshData {
    fn from(value: Object3) -> Self {
        value.mesh
    }
}
