//! Shared types used throughout the library.

mod direction;

pub use direction::Direction;

use crate::error::{ArchitectError, Result};
use crate::geometry::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A block position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const ORIGIN: BlockPosition = BlockPosition { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing a continuous point.
    pub fn containing(point: Vec3) -> Self {
        let cell = point.floor();
        Self::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// Center point of the unit cube at this position.
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn min(&self, other: BlockPosition) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(&self, other: BlockPosition) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn to_array(&self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for BlockPosition {
    fn from(value: [i32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<BlockPosition> for [i32; 3] {
    fn from(value: BlockPosition) -> Self {
        value.to_array()
    }
}

/// An integer axis-aligned box: `origin` is the minimum corner, `size` the
/// inclusive span + 1 on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockBounds {
    pub origin: BlockPosition,
    pub size: [i32; 3],
}

impl BlockBounds {
    /// Bounds of a store with no occupied cells.
    pub const EMPTY: BlockBounds = BlockBounds {
        origin: BlockPosition::ORIGIN,
        size: [0, 0, 0],
    };

    pub fn new(origin: BlockPosition, size: [i32; 3]) -> Self {
        Self { origin, size }
    }

    /// Smallest bounds covering every position, or [`BlockBounds::EMPTY`].
    pub fn from_positions(positions: impl IntoIterator<Item = BlockPosition>) -> Self {
        let mut positions = positions.into_iter();
        let Some(first) = positions.next() else {
            return Self::EMPTY;
        };

        let (min, max) = positions.fold((first, first), |(min, max), pos| {
            (min.min(pos), max.max(pos))
        });

        Self {
            origin: min,
            size: [max.x - min.x + 1, max.y - min.y + 1, max.z - min.z + 1],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.iter().any(|s| *s <= 0)
    }

    /// Number of cells in the box.
    pub fn volume(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.size.iter().map(|s| *s as usize).product()
        }
    }

    /// Number of cells, or `None` when the count or the far corner does not fit.
    pub fn checked_volume(&self) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        let origin = self.origin.to_array();
        for (o, s) in origin.iter().zip(self.size) {
            o.checked_add(s)?;
        }
        self.size
            .iter()
            .try_fold(1usize, |cells, s| cells.checked_mul(usize::try_from(*s).ok()?))
    }

    pub fn max_inclusive(&self) -> BlockPosition {
        self.origin
            .offset(self.size[0] - 1, self.size[1] - 1, self.size[2] - 1)
    }

    pub fn contains(&self, pos: BlockPosition) -> bool {
        !self.is_empty()
            && pos.x >= self.origin.x
            && pos.y >= self.origin.y
            && pos.z >= self.origin.z
            && (pos.x as i64) < self.origin.x as i64 + self.size[0] as i64
            && (pos.y as i64) < self.origin.y as i64 + self.size[1] as i64
            && (pos.z as i64) < self.origin.z as i64 + self.size[2] as i64
    }

    /// Every position in the box, `y` outermost, then `z`, then `x`.
    pub fn positions(&self) -> impl Iterator<Item = BlockPosition> + '_ {
        let [sx, sy, sz] = if self.is_empty() { [0; 3] } else { self.size };
        let origin = self.origin;
        (0..sy).flat_map(move |y| {
            (0..sz).flat_map(move |z| (0..sx).map(move |x| origin.offset(x, y, z)))
        })
    }
}

/// A namespaced identifier such as `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    pub fn minecraft(path: impl Into<String>) -> Self {
        Self::new("minecraft", path)
    }

    /// Parse a resource location, defaulting the namespace to `minecraft`.
    /// "minecraft:block/stone" -> ("minecraft", "block/stone")
    /// "block/stone" -> ("minecraft", "block/stone")
    pub fn parse(resource_location: &str) -> Self {
        match resource_location.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::minecraft(resource_location),
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// A placed block: one block state plus optional block-entity NBT.
///
/// Identity (for palettes and equality of placed states) is the
/// [`state_key`](Block::state_key): the namespaced name followed by the sorted
/// property list, e.g. `minecraft:oak_log[axis=y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block name, e.g., "minecraft:stone"
    pub name: String,
    /// Block properties, e.g., {"facing": "north"}
    pub properties: BTreeMap<String, String>,
    /// Block-entity data carried along with the state.
    pub nbt: Option<fastnbt::Value>,
}

impl Block {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: ResourceLocation::parse(name.as_ref()).to_string(),
            properties: BTreeMap::new(),
            nbt: None,
        }
    }

    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_nbt(mut self, nbt: fastnbt::Value) -> Self {
        self.nbt = Some(nbt);
        self
    }

    /// Parse a state key such as `minecraft:oak_log[axis=y]`.
    pub fn from_state_key(key: &str) -> Result<Self> {
        let Some((name, rest)) = key.split_once('[') else {
            return Ok(Self::new(key));
        };

        let body = rest.strip_suffix(']').ok_or_else(|| {
            ArchitectError::SchemeMismatch(format!("unterminated block state '{}'", key))
        })?;

        let mut block = Self::new(name);
        for pair in body.split(',').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').ok_or_else(|| {
                ArchitectError::SchemeMismatch(format!("invalid property '{}' in '{}'", pair, key))
            })?;
            block.properties.insert(k.to_string(), v.to_string());
        }
        Ok(block)
    }

    /// The palette identity of this block.
    pub fn state_key(&self) -> String {
        if self.properties.is_empty() {
            return self.name.clone();
        }
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}[{}]", self.name, props.join(","))
    }

    pub fn location(&self) -> ResourceLocation {
        ResourceLocation::parse(&self.name)
    }

    /// Check if this is an air block.
    pub fn is_air(&self) -> bool {
        matches!(
            self.name.as_str(),
            "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air"
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.state_key())
    }
}
