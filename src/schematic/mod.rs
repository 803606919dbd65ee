//! Sparse block storage.
//!
//! Three interchangeable stores implement [`Schematic`]:
//!
//! - [`NestedSchematic`]: `x -> y -> z -> Block` maps, simplest, for ad hoc edits.
//! - [`PaletteSchematic`]: palette indices keyed by a bit-packed position, the
//!   general purpose default.
//! - [`DenseSchematic`]: a flat index array over a region known up front, for
//!   bulk transfer of fixed-size exports.
//!
//! [`SchematicKind`] picks one at runtime.

mod dense;
mod nested;
mod packed;
mod palette;

pub use dense::{DenseSchematic, MAX_DENSE_CELLS};
pub use nested::NestedSchematic;
pub use packed::{pack_position, unpack_position, PaletteSchematic, PACKED_LIMITS};
pub use palette::Palette;

use crate::error::Result;
use crate::types::{Block, BlockBounds, BlockPosition};
use serde_json::json;

/// A mapping from block positions to blocks.
pub trait Schematic: Send + std::fmt::Debug {
    /// Get the block at a position.
    fn get_block(&self, pos: BlockPosition) -> Option<&Block>;

    /// Insert or overwrite the block at a position.
    fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<()>;

    /// Clear a cell. Returns whether it was occupied.
    fn remove_block(&mut self, pos: BlockPosition) -> bool;

    /// Iterate over all occupied cells.
    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_>;

    /// Empty the store and its palette.
    fn clear(&mut self);

    /// Number of occupied cells.
    fn len(&self) -> usize {
        self.iter_blocks().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of the occupied cells, [`BlockBounds::EMPTY`] when there are none.
    fn size(&self) -> BlockBounds {
        BlockBounds::from_positions(self.iter_blocks().map(|(pos, _)| pos))
    }

    /// Owned copy of every occupied cell.
    fn all_blocks(&self) -> Vec<(BlockPosition, Block)> {
        self.iter_blocks()
            .map(|(pos, block)| (pos, block.clone()))
            .collect()
    }

    /// Iterate over blocks within a region.
    fn blocks_in_region(
        &self,
        bounds: BlockBounds,
    ) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_> {
        Box::new(
            self.iter_blocks()
                .filter(move |(pos, _)| bounds.contains(*pos)),
        )
    }

    /// Copy every block of `other` in. Blocks of `other` win on collision.
    fn join(&mut self, other: &dyn Schematic) -> Result<()> {
        for (pos, block) in other.iter_blocks() {
            self.set_block(pos, block.clone())?;
        }
        Ok(())
    }

    /// `{"blocks": [{"pos": [x, y, z], "block": "<state>"}, ...]}`, sorted by position.
    fn to_linear_json(&self) -> serde_json::Value {
        let mut blocks: Vec<_> = self.iter_blocks().collect();
        blocks.sort_by_key(|(pos, _)| *pos);
        json!({
            "blocks": blocks
                .into_iter()
                .map(|(pos, block)| json!({ "pos": pos.to_array(), "block": block.state_key() }))
                .collect::<Vec<_>>()
        })
    }

    /// Text dump: one slice per `z`, rows from the top, `#` for occupied cells.
    fn render_ascii(&self) -> String {
        let bounds = self.size();
        let mut out = format!(
            "Schematic: [offset: {:?}, size: {:?}]\n",
            bounds.origin.to_array(),
            bounds.size
        );
        if bounds.is_empty() {
            return out;
        }
        let max = bounds.max_inclusive();
        for z in bounds.origin.z..=max.z {
            out.push_str(&format!("  z: {}\n", z));
            for y in (bounds.origin.y..=max.y).rev() {
                for x in bounds.origin.x..=max.x {
                    let occupied = self.get_block(BlockPosition::new(x, y, z)).is_some();
                    out.push(if occupied { '#' } else { ' ' });
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Which store to build for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchematicKind {
    Nested,
    #[default]
    Palette,
    /// Dense storage over a fixed region.
    Dense(BlockBounds),
}

impl SchematicKind {
    /// An empty store of this kind.
    pub fn create(&self) -> Result<Box<dyn Schematic>> {
        Ok(match self {
            SchematicKind::Nested => Box::new(NestedSchematic::new()),
            SchematicKind::Palette => Box::new(PaletteSchematic::new()),
            SchematicKind::Dense(region) => Box::new(DenseSchematic::new(*region)?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchematicKind::Nested => "nested",
            SchematicKind::Palette => "palette",
            SchematicKind::Dense(_) => "dense",
        }
    }
}
