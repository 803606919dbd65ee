//! Palette store keyed by bit-packed positions.

use super::{Palette, Schematic};
use crate::error::{ArchitectError, Result};
use crate::types::{Block, BlockPosition};
use std::collections::HashMap;

const X_BITS: u32 = 11;
const Y_BITS: u32 = 10;
const Z_BITS: u32 = 11;

const X_BIAS: i32 = 1 << (X_BITS - 1);
const Y_BIAS: i32 = 1 << (Y_BITS - 1);
const Z_BIAS: i32 = 1 << (Z_BITS - 1);

/// Inclusive `(min, max)` per axis a packed key can hold.
pub const PACKED_LIMITS: [(i32, i32); 3] = [
    (-X_BIAS, X_BIAS - 1),
    (-Y_BIAS, Y_BIAS - 1),
    (-Z_BIAS, Z_BIAS - 1),
];

/// Pack a position into 32 bits: 11 for x, 10 for y, 11 for z, each biased
/// to be non-negative. Positions outside [`PACKED_LIMITS`] are rejected.
pub fn pack_position(pos: BlockPosition) -> Result<u32> {
    let in_range = pos
        .to_array()
        .iter()
        .zip(PACKED_LIMITS)
        .all(|(v, (min, max))| (min..=max).contains(v));
    if !in_range {
        return Err(ArchitectError::OutOfRange {
            pos: pos.to_array(),
            limit: format!("packed key range {:?}", PACKED_LIMITS),
        });
    }
    let x = (pos.x + X_BIAS) as u32;
    let y = (pos.y + Y_BIAS) as u32;
    let z = (pos.z + Z_BIAS) as u32;
    Ok((x << (Y_BITS + Z_BITS)) | (y << Z_BITS) | z)
}

pub fn unpack_position(key: u32) -> BlockPosition {
    let x = (key >> (Y_BITS + Z_BITS)) & ((1 << X_BITS) - 1);
    let y = (key >> Z_BITS) & ((1 << Y_BITS) - 1);
    let z = key & ((1 << Z_BITS) - 1);
    BlockPosition::new(x as i32 - X_BIAS, y as i32 - Y_BIAS, z as i32 - Z_BIAS)
}

/// Block store mapping packed positions to palette indices.
#[derive(Debug, Clone, Default)]
pub struct PaletteSchematic {
    palette: Palette,
    blocks: HashMap<u32, u16>,
}

impl PaletteSchematic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// `(position, palette index)` pairs ordered by packed key.
    pub fn indexed_blocks(&self) -> Vec<(BlockPosition, u16)> {
        let mut keys: Vec<_> = self.blocks.iter().map(|(k, v)| (*k, *v)).collect();
        keys.sort_unstable();
        keys.into_iter()
            .map(|(key, id)| (unpack_position(key), id))
            .collect()
    }

    /// Rebuild from a palette and indexed positions.
    pub fn from_parts(
        palette: Vec<Block>,
        blocks: impl IntoIterator<Item = (BlockPosition, u16)>,
    ) -> Result<Self> {
        let mut schematic = Self::new();
        let mut remap = Vec::with_capacity(palette.len());
        for block in palette {
            remap.push(schematic.palette.get_or_insert(block)?);
        }
        for (pos, id) in blocks {
            let mapped = remap.get(id as usize).copied().ok_or_else(|| {
                ArchitectError::SchemeMismatch(format!(
                    "palette index {} out of {} entries",
                    id,
                    remap.len()
                ))
            })?;
            schematic.blocks.insert(pack_position(pos)?, mapped);
        }
        Ok(schematic)
    }
}

impl Schematic for PaletteSchematic {
    fn get_block(&self, pos: BlockPosition) -> Option<&Block> {
        let key = pack_position(pos).ok()?;
        self.blocks
            .get(&key)
            .and_then(|id| self.palette.get(*id))
    }

    fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<()> {
        let key = pack_position(pos)?;
        let id = self.palette.get_or_insert(block)?;
        self.blocks.insert(key, id);
        Ok(())
    }

    fn remove_block(&mut self, pos: BlockPosition) -> bool {
        match pack_position(pos) {
            Ok(key) => self.blocks.remove(&key).is_some(),
            Err(_) => false,
        }
    }

    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_> {
        Box::new(self.blocks.iter().filter_map(|(key, id)| {
            self.palette
                .get(*id)
                .map(|block| (unpack_position(*key), block))
        }))
    }

    fn clear(&mut self) {
        self.palette.clear();
        self.blocks.clear();
    }

    fn len(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pack_round_trip_at_limits() {
        for pos in [
            BlockPosition::new(-1024, -512, -1024),
            BlockPosition::new(1023, 511, 1023),
            BlockPosition::new(-1, -1, -1),
            BlockPosition::ORIGIN,
        ] {
            assert_eq!(unpack_position(pack_position(pos).unwrap()), pos);
        }
    }

    #[test]
    fn test_pack_rejects_overflow() {
        for pos in [
            BlockPosition::new(1024, 0, 0),
            BlockPosition::new(0, -513, 0),
            BlockPosition::new(0, 0, -1025),
        ] {
            assert!(matches!(
                pack_position(pos),
                Err(ArchitectError::OutOfRange { .. })
            ));
        }
        let mut schematic = PaletteSchematic::new();
        assert!(schematic.set_block(BlockPosition::new(0, 600, 0), Block::new("stone")).is_err());
        assert!(schematic.get_block(BlockPosition::new(0, 600, 0)).is_none());
    }

    #[test]
    fn test_distinct_keys() {
        let keys: HashSet<u32> = [
            BlockPosition::new(1, 0, 0),
            BlockPosition::new(0, 1, 0),
            BlockPosition::new(0, 0, 1),
            BlockPosition::new(-1, 0, 0),
        ]
        .into_iter()
        .map(|p| pack_position(p).unwrap())
        .collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_palette_never_duplicates_states() {
        let mut schematic = PaletteSchematic::new();
        let names = ["stone", "dirt", "stone", "minecraft:stone", "dirt", "air"];
        for (i, name) in names.iter().enumerate() {
            schematic
                .set_block(BlockPosition::new(i as i32, 0, 0), Block::new(name))
                .unwrap();
        }
        let keys = schematic.palette().state_keys();
        let distinct: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), distinct.len());
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_indexed_blocks_are_sorted() {
        let mut schematic = PaletteSchematic::new();
        schematic.set_block(BlockPosition::new(3, 0, 0), Block::new("dirt")).unwrap();
        schematic.set_block(BlockPosition::new(-3, 0, 0), Block::new("stone")).unwrap();
        assert_eq!(
            schematic.indexed_blocks(),
            vec![
                (BlockPosition::new(-3, 0, 0), 1),
                (BlockPosition::new(3, 0, 0), 0),
            ]
        );
    }

    #[test]
    fn test_from_parts_rejects_bad_index() {
        let err = PaletteSchematic::from_parts(
            vec![Block::new("stone")],
            [(BlockPosition::ORIGIN, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, ArchitectError::SchemeMismatch(_)));
    }
}
