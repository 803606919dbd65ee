//! Generic NBT structure export (`.nbt`).

use super::{gunzip, gzip};
use crate::error::{ArchitectError, Result};
use crate::schematic::{PaletteSchematic, Schematic};
use crate::types::{Block, BlockPosition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Root compound of a structure file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNbt {
    pub size: Vec<i32>,
    #[serde(default)]
    pub entities: Vec<fastnbt::Value>,
    pub blocks: Vec<StructureBlock>,
    pub palette: Vec<StructurePaletteEntry>,
    #[serde(rename = "DataVersion")]
    pub data_version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureBlock {
    /// Position relative to the structure origin.
    pub pos: Vec<i32>,
    /// Index into the palette.
    pub state: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<fastnbt::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructurePaletteEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Properties", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl StructureNbt {
    /// Walk the bounding box `y`, `z`, `x` and record every occupied cell.
    /// Palette order is first seen.
    pub fn from_schematic(schematic: &dyn Schematic, data_version: i32) -> Result<Self> {
        let bounds = schematic.size();
        let mut ids: HashMap<String, i32> = HashMap::new();
        let mut palette = Vec::new();
        let mut blocks = Vec::new();

        for pos in bounds.positions() {
            let Some(block) = schematic.get_block(pos) else {
                continue;
            };
            let key = block.state_key();
            let state = match ids.get(&key) {
                Some(id) => *id,
                None => {
                    let id = palette.len() as i32;
                    palette.push(StructurePaletteEntry {
                        name: block.name.clone(),
                        properties: block.properties.clone(),
                    });
                    ids.insert(key, id);
                    id
                }
            };
            blocks.push(StructureBlock {
                pos: vec![
                    pos.x - bounds.origin.x,
                    pos.y - bounds.origin.y,
                    pos.z - bounds.origin.z,
                ],
                state,
                nbt: block.nbt.clone(),
            });
        }

        Ok(Self {
            size: bounds.size.to_vec(),
            entities: Vec::new(),
            blocks,
            palette,
            data_version,
        })
    }

    /// Blocks placed relative to the origin.
    pub fn to_schematic(&self) -> Result<PaletteSchematic> {
        let palette: Vec<Block> = self
            .palette
            .iter()
            .map(|entry| Block {
                name: entry.name.clone(),
                properties: entry.properties.clone(),
                nbt: None,
            })
            .collect();

        let mut schematic = PaletteSchematic::new();
        for block in &self.blocks {
            let mut placed = palette.get(block.state as usize).cloned().ok_or_else(|| {
                ArchitectError::SchemeMismatch(format!(
                    "structure block state {} out of {} palette entries",
                    block.state,
                    palette.len()
                ))
            })?;
            placed.nbt = block.nbt.clone();

            let [x, y, z] = <[i32; 3]>::try_from(block.pos.as_slice()).map_err(|_| {
                ArchitectError::SchemeMismatch(format!("structure block position {:?}", block.pos))
            })?;
            schematic.set_block(BlockPosition::new(x, y, z), placed)?;
        }
        Ok(schematic)
    }
}

/// Gzipped structure NBT of a schematic.
pub fn to_nbt(schematic: &dyn Schematic, data_version: i32) -> Result<Vec<u8>> {
    let structure = StructureNbt::from_schematic(schematic, data_version)?;
    gzip(&fastnbt::to_bytes(&structure)?)
}

/// Parse a gzipped structure NBT.
pub fn read_nbt(data: &[u8]) -> Result<StructureNbt> {
    Ok(fastnbt::from_bytes(&gunzip(data)?)?)
}
