//! Continuous geometry and its rasterization into block positions.
//!
//! Vectors are glam's double precision types. Solids are voxelized by casting
//! a ray up from every cell center in their bounding box; lines are walked
//! cell by cell along their (sampled) polyline.

mod line;
mod object;
mod quaternion;
mod ray;
mod surface;

pub use glam::{DVec2 as Vec2, DVec3 as Vec3};
pub use line::{
    BezierCurve3, Line3, Line3Part, Segment3, CURVE_TOLERANCE, DEFAULT_BEZIER_PRECISION,
    SEGMENT_TOLERANCE,
};
pub use object::{ContainmentMode, MeshData, Object3};
pub use quaternion::Quaternion;
pub use ray::{Ray, PARALLEL_EPSILON};
pub use surface::Surface;

use crate::error::Result;
use crate::types::BlockPosition;
use serde::{Deserialize, Serialize};

/// Which geometry variant a node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Line,
    Surface,
    Object,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Line => "line",
            GeometryKind::Surface => "surface",
            GeometryKind::Object => "object",
        }
    }
}

/// One piece of geometry of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Line(Line3),
    Surface(Surface),
    Object(Object3),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Line(_) => GeometryKind::Line,
            Geometry::Surface(_) => GeometryKind::Surface,
            Geometry::Object(_) => GeometryKind::Object,
        }
    }

    /// Parse the geometry JSON that belongs to `kind`.
    pub fn from_json(kind: GeometryKind, value: serde_json::Value) -> Result<Self> {
        Ok(match kind {
            GeometryKind::Line => Geometry::Line(serde_json::from_value(value)?),
            GeometryKind::Surface => Geometry::Surface(serde_json::from_value(value)?),
            GeometryKind::Object => Geometry::Object(serde_json::from_value(value)?),
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Geometry::Line(line) => serde_json::to_value(line)?,
            Geometry::Surface(surface) => serde_json::to_value(surface)?,
            Geometry::Object(object) => serde_json::to_value(object)?,
        })
    }

    /// Occupied cells. Surfaces are not rasterized yet and fail with `Unsupported`.
    pub fn blocks(&self, containment: ContainmentMode) -> Result<Vec<BlockPosition>> {
        match self {
            Geometry::Line(line) => Ok(line.blocks()),
            Geometry::Surface(surface) => surface.blocks(),
            Geometry::Object(object) => Ok(object.blocks(containment)),
        }
    }
}
