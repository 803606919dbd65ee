//! Nested-map block store.

use super::Schematic;
use crate::error::Result;
use crate::types::{Block, BlockPosition};
use std::collections::HashMap;

type Column = HashMap<i32, Block>;
type Plane = HashMap<i32, Column>;

/// `x -> y -> z -> Block`, no palette. Empty inner maps are pruned on removal.
#[derive(Debug, Clone, Default)]
pub struct NestedSchematic {
    blocks: HashMap<i32, Plane>,
}

impl NestedSchematic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty `x` planes.
    pub fn plane_count(&self) -> usize {
        self.blocks.len()
    }
}

impl Schematic for NestedSchematic {
    fn get_block(&self, pos: BlockPosition) -> Option<&Block> {
        self.blocks.get(&pos.x)?.get(&pos.y)?.get(&pos.z)
    }

    fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<()> {
        self.blocks
            .entry(pos.x)
            .or_default()
            .entry(pos.y)
            .or_default()
            .insert(pos.z, block);
        Ok(())
    }

    fn remove_block(&mut self, pos: BlockPosition) -> bool {
        let Some(plane) = self.blocks.get_mut(&pos.x) else {
            return false;
        };
        let Some(column) = plane.get_mut(&pos.y) else {
            return false;
        };
        let removed = column.remove(&pos.z).is_some();
        if column.is_empty() {
            plane.remove(&pos.y);
        }
        if plane.is_empty() {
            self.blocks.remove(&pos.x);
        }
        removed
    }

    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_> {
        Box::new(self.blocks.iter().flat_map(|(x, plane)| {
            plane.iter().flat_map(move |(y, column)| {
                column
                    .iter()
                    .map(move |(z, block)| (BlockPosition::new(*x, *y, *z), block))
            })
        }))
    }

    fn clear(&mut self) {
        self.blocks.clear();
    }

    fn len(&self) -> usize {
        self.blocks
            .values()
            .flat_map(|plane| plane.values())
            .map(|column| column.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_prunes_empty_levels() {
        let mut schematic = NestedSchematic::new();
        schematic.set_block(BlockPosition::new(1, 2, 3), Block::new("stone")).unwrap();
        schematic.set_block(BlockPosition::new(1, 2, 4), Block::new("stone")).unwrap();
        schematic.set_block(BlockPosition::new(7, 0, 0), Block::new("dirt")).unwrap();
        assert_eq!(schematic.plane_count(), 2);

        assert!(schematic.remove_block(BlockPosition::new(1, 2, 3)));
        assert_eq!(schematic.plane_count(), 2);
        assert!(schematic.remove_block(BlockPosition::new(1, 2, 4)));
        assert_eq!(schematic.plane_count(), 1);
        assert!(schematic.blocks.get(&1).is_none());

        assert!(schematic.remove_block(BlockPosition::new(7, 0, 0)));
        assert!(schematic.blocks.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut schematic = NestedSchematic::new();
        let pos = BlockPosition::new(0, 0, 0);
        schematic.set_block(pos, Block::new("stone")).unwrap();
        schematic.set_block(pos, Block::new("dirt")).unwrap();
        assert_eq!(schematic.len(), 1);
        assert_eq!(schematic.get_block(pos).unwrap().name, "minecraft:dirt");
    }

    #[test]
    fn test_missing_remove_leaves_structure() {
        let mut schematic = NestedSchematic::new();
        schematic.set_block(BlockPosition::new(0, 0, 0), Block::new("stone")).unwrap();
        assert!(!schematic.remove_block(BlockPosition::new(0, 0, 9)));
        assert_eq!(schematic.len(), 1);
    }
}
