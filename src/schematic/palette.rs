//! Deduplicated block palettes.

use crate::error::{ArchitectError, Result};
use crate::types::Block;
use std::collections::HashMap;

/// Distinct blocks addressed by small indices. A block state is stored once,
/// identified by its [`state_key`](Block::state_key).
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entries: Vec<Block>,
    index: HashMap<String, u16>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// A palette with air pre-registered at index 0.
    pub fn with_air() -> Self {
        let mut palette = Self::new();
        palette.entries.push(Block::air());
        palette.index.insert(Block::air().state_key(), 0);
        palette
    }

    /// Index of `block`, registering it first if its state is new.
    pub fn get_or_insert(&mut self, block: Block) -> Result<u16> {
        let key = block.state_key();
        if let Some(id) = self.index.get(&key) {
            return Ok(*id);
        }
        let id = u16::try_from(self.entries.len()).map_err(|_| {
            ArchitectError::Unsupported(format!(
                "more than {} distinct block states",
                u16::MAX as usize + 1
            ))
        })?;
        self.entries.push(block);
        self.index.insert(key, id);
        Ok(id)
    }

    pub fn index_of(&self, block: &Block) -> Option<u16> {
        self.index.get(&block.state_key()).copied()
    }

    pub fn get(&self, id: u16) -> Option<&Block> {
        self.entries.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Block] {
        &self.entries
    }

    /// State keys in index order.
    pub fn state_keys(&self) -> Vec<String> {
        self.entries.iter().map(Block::state_key).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
