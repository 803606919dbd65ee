//! Sponge schematic v2 export (`.schem`).

use super::{gunzip, gzip};
use crate::error::{ArchitectError, Result};
use crate::schematic::{DenseSchematic, Schematic};
use crate::types::{Block, BlockBounds, BlockPosition};
use fastnbt::{ByteArray, IntArray, SerOpts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SPONGE_VERSION: i32 = 2;

/// Root compound (`Schematic`) of a v2 file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpongeSchematic {
    pub version: i32,
    pub data_version: i32,
    pub width: i16,
    pub height: i16,
    pub length: i16,
    pub offset: IntArray,
    pub palette_max: i32,
    pub palette: BTreeMap<String, i32>,
    pub block_data: ByteArray,
    #[serde(default)]
    pub block_entities: Vec<fastnbt::Value>,
    pub metadata: SpongeMetadata,
}

/// WorldEdit placement offset: the origin of the exported box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpongeMetadata {
    #[serde(rename = "WEOffsetX")]
    pub we_offset_x: i32,
    #[serde(rename = "WEOffsetY")]
    pub we_offset_y: i32,
    #[serde(rename = "WEOffsetZ")]
    pub we_offset_z: i32,
}

impl SpongeSchematic {
    /// One palette index per cell of the bounding box, `y`, then `z`, then `x`.
    /// Air is index 0 and fills empty cells.
    pub fn from_schematic(schematic: &dyn Schematic, data_version: i32) -> Result<Self> {
        let bounds = schematic.size();
        let [width, height, length] = dimensions(bounds)?;

        let mut palette = BTreeMap::new();
        palette.insert(Block::air().state_key(), 0);
        let mut next_id = 1;

        let mut block_data = Vec::with_capacity(bounds.volume());
        for pos in bounds.positions() {
            let id = match schematic.get_block(pos) {
                None => 0,
                Some(block) => *palette.entry(block.state_key()).or_insert_with(|| {
                    next_id += 1;
                    next_id - 1
                }),
            };
            write_varint(&mut block_data, id as u32);
        }

        Ok(Self {
            version: SPONGE_VERSION,
            data_version,
            width,
            height,
            length,
            offset: IntArray::new(vec![0, 0, 0]),
            palette_max: palette.len() as i32,
            palette,
            block_data: ByteArray::new(block_data.into_iter().map(|b| b as i8).collect()),
            block_entities: Vec::new(),
            metadata: SpongeMetadata {
                we_offset_x: bounds.origin.x,
                we_offset_y: bounds.origin.y,
                we_offset_z: bounds.origin.z,
            },
        })
    }

    /// The box the block data covers, placed at the WorldEdit offset.
    pub fn region(&self) -> BlockBounds {
        BlockBounds::new(
            BlockPosition::new(
                self.metadata.we_offset_x,
                self.metadata.we_offset_y,
                self.metadata.we_offset_z,
            ),
            [self.width as i32, self.height as i32, self.length as i32],
        )
    }

    /// Decode the block data into a dense store over [`region`](Self::region).
    pub fn to_schematic(&self) -> Result<DenseSchematic> {
        let mut palette = vec![Block::air(); self.palette.len().max(1)];
        for (key, id) in &self.palette {
            let slot = usize::try_from(*id)
                .ok()
                .and_then(|i| palette.get_mut(i))
                .ok_or_else(|| {
                    ArchitectError::SchemeMismatch(format!("palette id {} for '{}'", id, key))
                })?;
            *slot = Block::from_state_key(key)?;
        }

        let bytes: Vec<u8> = self.block_data.iter().map(|b| *b as u8).collect();
        let mut indices = Vec::with_capacity(bytes.len());
        let mut offset = 0;
        while offset < bytes.len() {
            let (value, size) = read_varint(&bytes, offset)?;
            let id = u16::try_from(value).map_err(|_| {
                ArchitectError::SchemeMismatch(format!("block data index {}", value))
            })?;
            indices.push(id);
            offset += size;
        }

        DenseSchematic::from_parts(self.region(), palette, indices)
    }
}

fn dimensions(bounds: BlockBounds) -> Result<[i16; 3]> {
    let mut out = [0i16; 3];
    for (dim, size) in out.iter_mut().zip(bounds.size) {
        *dim = i16::try_from(size).map_err(|_| ArchitectError::OutOfRange {
            pos: bounds.max_inclusive().to_array(),
            limit: format!("sponge schematic extent of {} per axis", i16::MAX),
        })?;
    }
    Ok(out)
}

/// Unsigned LEB128, one byte for indices below 128.
pub fn write_varint(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn read_varint(bytes: &[u8], offset: usize) -> Result<(u32, usize)> {
    let mut value = 0u32;
    for (i, byte) in bytes[offset.min(bytes.len())..].iter().enumerate().take(5) {
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ArchitectError::BufferUnderflow {
        offset,
        needed: 1,
        available: 0,
    })
}

/// Gzipped `.schem` bytes of a schematic.
pub fn to_schem(schematic: &dyn Schematic, data_version: i32) -> Result<Vec<u8>> {
    let sponge = SpongeSchematic::from_schematic(schematic, data_version)?;
    let nbt = fastnbt::to_bytes_with_opts(&sponge, SerOpts::new().root_name("Schematic"))?;
    gzip(&nbt)
}

/// Parse a gzipped `.schem`.
pub fn read_schem(data: &[u8]) -> Result<SpongeSchematic> {
    Ok(fastnbt::from_bytes(&gunzip(data)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::PaletteSchematic;
    use fastnbt::Value;

    fn sample() -> PaletteSchematic {
        let mut schematic = PaletteSchematic::new();
        schematic.set_block(BlockPosition::new(-1, 64, 2), Block::new("stone")).unwrap();
        schematic.set_block(BlockPosition::new(0, 64, 2), Block::new("dirt")).unwrap();
        schematic.set_block(BlockPosition::new(0, 65, 3), Block::new("stone")).unwrap();
        schematic
    }

    #[test]
    fn test_block_data_covers_bounding_box() {
        let sponge = SpongeSchematic::from_schematic(&sample(), 3465).unwrap();
        assert_eq!((sponge.width, sponge.height, sponge.length), (2, 2, 2));
        assert_eq!(sponge.palette_max, 3);
        assert_eq!(sponge.palette["minecraft:air"], 0);
        assert_eq!(sponge.palette["minecraft:stone"], 1);
        assert_eq!(sponge.palette["minecraft:dirt"], 2);
        // y=64: z=2 [stone, dirt], z=3 [air, air]; y=65: z=2 [air, air], z=3 [air, stone]
        assert_eq!(&*sponge.block_data, &[1, 2, 0, 0, 0, 0, 0, 1]);
        assert_eq!(
            sponge.metadata,
            SpongeMetadata {
                we_offset_x: -1,
                we_offset_y: 64,
                we_offset_z: 2
            }
        );
    }

    #[test]
    fn test_root_tags() {
        let bytes = to_schem(&sample(), 3465).unwrap();
        let raw = gunzip(&bytes).unwrap();
        // compound tag, then the root name
        assert_eq!(raw[0], 10);
        assert_eq!(&raw[1..3], &[0, 9]);
        assert_eq!(&raw[3..12], b"Schematic");

        let Value::Compound(root) = fastnbt::from_bytes::<Value>(&raw).unwrap() else {
            panic!("root is not a compound");
        };
        assert_eq!(root.get("Version"), Some(&Value::Int(2)));
        assert_eq!(root.get("Width"), Some(&Value::Short(2)));
        assert_eq!(root.get("PaletteMax"), Some(&Value::Int(3)));
        assert!(matches!(root.get("Offset"), Some(Value::IntArray(a)) if a.iter().all(|v| *v == 0)));
        assert!(matches!(root.get("BlockData"), Some(Value::ByteArray(_))));
        assert!(matches!(root.get("BlockEntities"), Some(Value::List(l)) if l.is_empty()));
    }

    #[test]
    fn test_read_back_into_dense() {
        let bytes = to_schem(&sample(), 3465).unwrap();
        let sponge = read_schem(&bytes).unwrap();
        let dense = sponge.to_schematic().unwrap();
        assert_eq!(dense.region().origin, BlockPosition::new(-1, 64, 2));
        assert_eq!(dense.len(), 3);
        assert_eq!(
            dense.get_block(BlockPosition::new(0, 64, 2)).unwrap().name,
            "minecraft:dirt"
        );
    }

    #[test]
    fn test_declared_extent_must_match_block_data() {
        let mut sponge = SpongeSchematic::from_schematic(&sample(), 3465).unwrap();
        sponge.width = i16::MAX;
        sponge.height = i16::MAX;
        sponge.length = i16::MAX;
        assert!(sponge.to_schematic().is_err());

        let mut sponge = SpongeSchematic::from_schematic(&sample(), 3465).unwrap();
        sponge.length = 3;
        assert!(matches!(sponge.to_schematic(), Err(ArchitectError::SchemeMismatch(_))));

        let mut sponge = SpongeSchematic::from_schematic(&sample(), 3465).unwrap();
        sponge.metadata.we_offset_x = i32::MAX;
        assert!(sponge.to_schematic().is_err());
    }

    #[test]
    fn test_varint() {
        for value in [0u32, 1, 127, 128, 300, 65535] {
            let mut out = Vec::new();
            write_varint(&mut out, value);
            assert_eq!(out.len(), if value < 128 { 1 } else if value < 16384 { 2 } else { 3 });
            assert_eq!(read_varint(&out, 0).unwrap(), (value, out.len()));
        }
        assert!(read_varint(&[0x80], 0).is_err());
    }

    #[test]
    fn test_empty_schematic() {
        let sponge = SpongeSchematic::from_schematic(&PaletteSchematic::new(), 1).unwrap();
        assert_eq!((sponge.width, sponge.height, sponge.length), (0, 0, 0));
        assert_eq!(sponge.palette_max, 1);
        assert!(sponge.block_data.is_empty());
    }

    #[test]
    fn test_oversized_extent_is_rejected() {
        let mut schematic = crate::schematic::NestedSchematic::new();
        schematic.set_block(BlockPosition::new(0, 0, 0), Block::new("stone")).unwrap();
        schematic.set_block(BlockPosition::new(40_000, 0, 0), Block::new("stone")).unwrap();
        assert!(matches!(
            SpongeSchematic::from_schematic(&schematic, 1),
            Err(ArchitectError::OutOfRange { .. })
        ));
    }
}
