//! BufferScheme wire forms of the block stores.
//!
//! Sparse stores travel as `{palette: [state], blocks: [[x, y, z, index]]}`.
//! Dense stores travel as `{pos, size, palette, blocks: [short]}` with one
//! index per cell of the region, air at index 0.

use crate::buffer::{BufferValue, Scheme};
use crate::error::{ArchitectError, Result};
use crate::schematic::{DenseSchematic, NestedSchematic, PaletteSchematic, Schematic};
use crate::types::{Block, BlockBounds, BlockPosition};
use std::collections::HashMap;

pub fn sparse_scheme() -> Scheme {
    Scheme::object([
        ("palette", Scheme::list(Scheme::String)),
        ("blocks", Scheme::list(Scheme::fixed_list(Scheme::Int, 4))),
    ])
}

pub fn dense_scheme() -> Scheme {
    Scheme::object([
        ("pos", Scheme::fixed_list(Scheme::Int, 3)),
        ("size", Scheme::fixed_list(Scheme::Int, 3)),
        ("palette", Scheme::list(Scheme::String)),
        ("blocks", Scheme::list(Scheme::Short)),
    ])
}

fn palette_value<'a>(states: impl IntoIterator<Item = &'a Block>) -> BufferValue {
    BufferValue::List(
        states
            .into_iter()
            .map(|block| BufferValue::String(block.state_key()))
            .collect(),
    )
}

fn sparse_value(palette: BufferValue, blocks: impl IntoIterator<Item = (BlockPosition, u16)>) -> BufferValue {
    BufferValue::object([
        ("palette", palette),
        (
            "blocks",
            BufferValue::List(
                blocks
                    .into_iter()
                    .map(|(pos, id)| BufferValue::int_list([pos.x, pos.y, pos.z, id as i32]))
                    .collect(),
            ),
        ),
    ])
}

/// Encode any store in the sparse form. Blocks are ordered by position and the
/// palette is built in that order.
pub fn encode_sparse(schematic: &dyn Schematic) -> Result<Vec<u8>> {
    let mut blocks: Vec<_> = schematic.iter_blocks().collect();
    blocks.sort_by_key(|(pos, _)| *pos);

    let mut ids: HashMap<String, u16> = HashMap::new();
    let mut palette: Vec<&Block> = Vec::new();
    let mut indexed = Vec::with_capacity(blocks.len());
    for (pos, block) in blocks {
        let key = block.state_key();
        let id = match ids.get(&key) {
            Some(id) => *id,
            None => {
                let id = u16::try_from(palette.len()).map_err(|_| {
                    ArchitectError::Unsupported("more than 65536 block states".to_string())
                })?;
                palette.push(block);
                ids.insert(key, id);
                id
            }
        };
        indexed.push((pos, id));
    }

    sparse_scheme().write_all(&sparse_value(palette_value(palette), indexed))
}

/// Encode a packed store using its own palette indices.
pub fn encode_palette(schematic: &PaletteSchematic) -> Result<Vec<u8>> {
    let value = sparse_value(
        palette_value(schematic.palette().entries()),
        schematic.indexed_blocks(),
    );
    sparse_scheme().write_all(&value)
}

fn read_sparse(data: &[u8]) -> Result<(Vec<Block>, Vec<(BlockPosition, u16)>)> {
    let value = sparse_scheme().read_all(data)?;
    let palette = read_palette(value.field("palette")?)?;
    let blocks = value
        .field("blocks")?
        .as_list()?
        .iter()
        .map(|entry| {
            let [x, y, z, id] = <[i32; 4]>::try_from(entry.to_ints()?).map_err(|ints| {
                ArchitectError::SchemeMismatch(format!("block entry {:?}", ints))
            })?;
            let id = u16::try_from(id)
                .map_err(|_| ArchitectError::SchemeMismatch(format!("palette index {}", id)))?;
            Ok((BlockPosition::new(x, y, z), id))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((palette, blocks))
}

fn read_palette(value: &BufferValue) -> Result<Vec<Block>> {
    value
        .as_list()?
        .iter()
        .map(|state| Block::from_state_key(state.as_str()?))
        .collect()
}

fn lookup(palette: &[Block], id: u16) -> Result<Block> {
    palette.get(id as usize).cloned().ok_or_else(|| {
        ArchitectError::SchemeMismatch(format!(
            "palette index {} out of {} entries",
            id,
            palette.len()
        ))
    })
}

pub fn decode_palette(data: &[u8]) -> Result<PaletteSchematic> {
    let (palette, blocks) = read_sparse(data)?;
    PaletteSchematic::from_parts(palette, blocks)
}

pub fn decode_nested(data: &[u8]) -> Result<NestedSchematic> {
    let (palette, blocks) = read_sparse(data)?;
    let mut schematic = NestedSchematic::new();
    for (pos, id) in blocks {
        schematic.set_block(pos, lookup(&palette, id)?)?;
    }
    Ok(schematic)
}

pub fn encode_dense(schematic: &DenseSchematic) -> Result<Vec<u8>> {
    let region = schematic.region();
    let value = BufferValue::object([
        ("pos", BufferValue::int_list(region.origin.to_array())),
        ("size", BufferValue::int_list(region.size)),
        ("palette", palette_value(schematic.palette().entries())),
        (
            "blocks",
            BufferValue::List(
                schematic
                    .indices()
                    .iter()
                    .map(|id| BufferValue::Short(*id as i16))
                    .collect(),
            ),
        ),
    ]);
    dense_scheme().write_all(&value)
}

pub fn decode_dense(data: &[u8]) -> Result<DenseSchematic> {
    let value = dense_scheme().read_all(data)?;
    let triple = |name: &str| -> Result<[i32; 3]> {
        <[i32; 3]>::try_from(value.field(name)?.to_ints()?)
            .map_err(|ints| ArchitectError::SchemeMismatch(format!("{} {:?}", name, ints)))
    };
    let region = BlockBounds::new(BlockPosition::from(triple("pos")?), triple("size")?);
    let palette = read_palette(value.field("palette")?)?;
    let indices = value
        .field("blocks")?
        .as_list()?
        .iter()
        .map(|id| id.as_short().map(|id| id as u16))
        .collect::<Result<Vec<_>>>()?;
    DenseSchematic::from_parts(region, palette, indices)
}
