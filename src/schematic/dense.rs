//! Dense store over a fixed region.

use super::{Palette, Schematic};
use crate::error::{ArchitectError, Result};
use crate::types::{Block, BlockBounds, BlockPosition};

/// Palette indices in a flat array over a region known up front.
///
/// Index 0 is air and marks an empty cell. Cells are laid out `y`, then `z`,
/// then `x`: `index = (y * size_z * size_x) + (z * size_x) + x`, relative to
/// the region origin.
#[derive(Debug, Clone)]
pub struct DenseSchematic {
    region: BlockBounds,
    palette: Palette,
    blocks: Vec<u16>,
}

/// Largest region a dense store will allocate, in cells.
pub const MAX_DENSE_CELLS: usize = 1 << 27;

fn region_cells(region: BlockBounds) -> Result<usize> {
    if region.size.iter().any(|s| *s < 0) {
        return Err(ArchitectError::InvalidGeometry(format!(
            "dense region with negative size {:?}",
            region.size
        )));
    }
    region
        .checked_volume()
        .filter(|cells| *cells <= MAX_DENSE_CELLS)
        .ok_or_else(|| ArchitectError::OutOfRange {
            pos: region.origin.to_array(),
            limit: format!(
                "dense region of size {:?} (at most {} cells)",
                region.size, MAX_DENSE_CELLS
            ),
        })
}

impl DenseSchematic {
    pub fn new(region: BlockBounds) -> Result<Self> {
        let cells = region_cells(region)?;
        Ok(Self {
            region,
            palette: Palette::with_air(),
            blocks: vec![0; cells],
        })
    }

    /// The declared region, occupied or not.
    pub fn region(&self) -> BlockBounds {
        self.region
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Raw palette indices in layout order.
    pub fn indices(&self) -> &[u16] {
        &self.blocks
    }

    /// Rebuild from a region, palette and raw indices.
    pub fn from_parts(region: BlockBounds, palette: Vec<Block>, mut indices: Vec<u16>) -> Result<Self> {
        let cells = region_cells(region)?;
        if indices.len() != cells {
            return Err(ArchitectError::SchemeMismatch(format!(
                "dense region of {} cells given {} indices",
                cells,
                indices.len()
            )));
        }

        // index 0 stays air whatever the sender put there
        let mut store = Palette::with_air();
        let mut remap = vec![0u16];
        for block in palette.into_iter().skip(1) {
            remap.push(store.get_or_insert(block)?);
        }
        for id in indices.iter_mut() {
            *id = remap.get(*id as usize).copied().ok_or_else(|| {
                ArchitectError::SchemeMismatch(format!("palette index {} out of range", id))
            })?;
        }
        Ok(Self {
            region,
            palette: store,
            blocks: indices,
        })
    }

    fn index(&self, pos: BlockPosition) -> Result<usize> {
        if !self.region.contains(pos) {
            return Err(ArchitectError::OutOfRange {
                pos: pos.to_array(),
                limit: format!(
                    "dense region at {:?} of size {:?}",
                    self.region.origin.to_array(),
                    self.region.size
                ),
            });
        }
        let [sx, _, sz] = self.region.size;
        let x = (pos.x - self.region.origin.x) as usize;
        let y = (pos.y - self.region.origin.y) as usize;
        let z = (pos.z - self.region.origin.z) as usize;
        Ok(y * sz as usize * sx as usize + z * sx as usize + x)
    }

    fn position(&self, index: usize) -> BlockPosition {
        let [sx, _, sz] = self.region.size;
        let (sx, sz) = (sx as usize, sz as usize);
        let x = index % sx;
        let z = (index / sx) % sz;
        let y = index / (sx * sz);
        self.region.origin.offset(x as i32, y as i32, z as i32)
    }
}

impl Schematic for DenseSchematic {
    fn get_block(&self, pos: BlockPosition) -> Option<&Block> {
        let index = self.index(pos).ok()?;
        match self.blocks[index] {
            0 => None,
            id => self.palette.get(id),
        }
    }

    fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<()> {
        let index = self.index(pos)?;
        let id = self.palette.get_or_insert(block)?;
        self.blocks[index] = id;
        Ok(())
    }

    fn remove_block(&mut self, pos: BlockPosition) -> bool {
        match self.index(pos) {
            Ok(index) => std::mem::replace(&mut self.blocks[index], 0) != 0,
            Err(_) => false,
        }
    }

    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_> {
        Box::new(
            self.blocks
                .iter()
                .enumerate()
                .filter(|(_, id)| **id != 0)
                .filter_map(|(i, id)| self.palette.get(*id).map(|block| (self.position(i), block))),
        )
    }

    fn clear(&mut self) {
        self.palette = Palette::with_air();
        self.blocks.iter_mut().for_each(|id| *id = 0);
    }

    fn len(&self) -> usize {
        self.blocks.iter().filter(|id| **id != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> BlockBounds {
        BlockBounds::new(BlockPosition::new(10, 0, -5), [3, 2, 4])
    }

    #[test]
    fn test_layout_is_y_z_x() {
        let mut schematic = DenseSchematic::new(region()).unwrap();
        schematic.set_block(BlockPosition::new(11, 1, -3), Block::new("stone")).unwrap();
        // y=1, z=2, x=1 -> 1*4*3 + 2*3 + 1
        assert_eq!(schematic.indices()[19], 1);
        assert_eq!(schematic.position(19), BlockPosition::new(11, 1, -3));
        assert_eq!(
            schematic.all_blocks(),
            vec![(BlockPosition::new(11, 1, -3), Block::new("stone"))]
        );
    }

    #[test]
    fn test_outside_region_is_rejected() {
        let mut schematic = DenseSchematic::new(region()).unwrap();
        let err = schematic
            .set_block(BlockPosition::new(13, 0, -5), Block::new("stone"))
            .unwrap_err();
        assert!(matches!(err, ArchitectError::OutOfRange { pos: [13, 0, -5], .. }));
        assert!(schematic.get_block(BlockPosition::new(0, 0, 0)).is_none());
        assert!(!schematic.remove_block(BlockPosition::new(0, 0, 0)));
    }

    #[test]
    fn test_air_is_empty() {
        let mut schematic = DenseSchematic::new(region()).unwrap();
        let pos = BlockPosition::new(10, 0, -5);
        schematic.set_block(pos, Block::air()).unwrap();
        assert!(schematic.get_block(pos).is_none());
        assert!(schematic.is_empty());
        assert_eq!(schematic.palette().len(), 1);
    }

    #[test]
    fn test_size_is_occupied_region_not_declared() {
        let mut schematic = DenseSchematic::new(region()).unwrap();
        schematic.set_block(BlockPosition::new(12, 1, -2), Block::new("stone")).unwrap();
        assert_eq!(schematic.size(), BlockBounds::new(BlockPosition::new(12, 1, -2), [1, 1, 1]));
        assert_eq!(schematic.region(), region());
    }

    #[test]
    fn test_from_parts_remaps_palette() {
        let indices = {
            let mut v = vec![0u16; 24];
            v[0] = 2;
            v[23] = 1;
            v
        };
        let schematic = DenseSchematic::from_parts(
            region(),
            vec![Block::air(), Block::new("dirt"), Block::new("stone")],
            indices,
        )
        .unwrap();
        assert_eq!(schematic.get_block(BlockPosition::new(10, 0, -5)).unwrap().name, "minecraft:stone");
        assert_eq!(schematic.get_block(BlockPosition::new(12, 1, -2)).unwrap().name, "minecraft:dirt");

        assert!(DenseSchematic::from_parts(region(), vec![Block::air()], vec![0; 3]).is_err());
        assert!(DenseSchematic::from_parts(region(), vec![Block::air()], vec![5; 24]).is_err());
    }

    #[test]
    fn test_oversized_regions_are_rejected() {
        let huge = BlockBounds::new(BlockPosition::ORIGIN, [i32::MAX; 3]);
        assert!(matches!(DenseSchematic::new(huge), Err(ArchitectError::OutOfRange { .. })));
        let wide = BlockBounds::new(BlockPosition::ORIGIN, [1 << 20; 3]);
        assert!(DenseSchematic::new(wide).is_err());
        assert!(DenseSchematic::from_parts(wide, vec![Block::air()], vec![0]).is_err());

        let edge = BlockBounds::new(BlockPosition::new(i32::MAX - 1, 0, 0), [4, 1, 1]);
        assert!(DenseSchematic::new(edge).is_err());

        let cap = BlockBounds::new(BlockPosition::ORIGIN, [1 << 9, 1 << 9, (1 << 9) + 1]);
        assert!(DenseSchematic::from_parts(cap, vec![Block::air()], Vec::new()).is_err());
    }

    #[test]
    fn test_empty_region() {
        let schematic = DenseSchematic::new(BlockBounds::EMPTY).unwrap();
        assert!(schematic.is_empty());
        assert!(DenseSchematic::new(BlockBounds::new(BlockPosition::ORIGIN, [1, -1, 1])).is_err());
    }
}
