//! Block catalogue lookup.
//!
//! Exports only ever reach the catalogue through [`BlockRegistry`]: a lookup
//! either finds the block or fails with [`ArchitectError::IdNotExists`]. There
//! is no silent substitution of an unknown id.
//!
//! [`ResourcePack`] is backed by the blockstate files of a Minecraft resource
//! pack (ZIP or directory). [`OpenRegistry`] accepts any id.

pub mod blockstate;
pub mod loader;

pub use blockstate::BlockstateDefinition;

use crate::error::{ArchitectError, Result};
use crate::types::{Block, ResourceLocation};
use std::collections::HashMap;

/// A block known to a registry, with its placeable states.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockType {
    pub location: ResourceLocation,
    /// Never empty; the first entry is the default state.
    pub states: Vec<Block>,
}

impl BlockType {
    /// A block with a single, property-less state.
    pub fn simple(location: ResourceLocation) -> Self {
        let states = vec![Block::new(location.to_string())];
        Self { location, states }
    }

    pub fn default_state(&self) -> Block {
        self.states
            .first()
            .cloned()
            .unwrap_or_else(|| Block::new(self.location.to_string()))
    }
}

/// Lookup boundary to the block catalogue.
pub trait BlockRegistry: Send + Sync {
    fn has_block(&self, id: &str) -> bool;

    /// Fails with [`ArchitectError::IdNotExists`] on unknown ids.
    fn get_block(&self, id: &str) -> Result<BlockType>;

    /// The full catalogue, where the registry can enumerate it.
    fn all_blocks(&self) -> Vec<BlockType>;
}

/// A loaded Minecraft resource pack.
#[derive(Debug, Default, Clone)]
pub struct ResourcePack {
    /// Blockstate definitions by namespace and block ID.
    /// Key: namespace (e.g., "minecraft"), Value: map of block_id to definition.
    pub blockstates: HashMap<String, HashMap<String, BlockstateDefinition>>,
}

impl ResourcePack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a blockstate definition by full resource location (e.g., "minecraft:stone").
    pub fn get_blockstate(&self, resource_location: &str) -> Option<&BlockstateDefinition> {
        let location = ResourceLocation::parse(resource_location);
        self.blockstates
            .get(&location.namespace)
            .and_then(|ns| ns.get(&location.path))
    }

    /// Add a blockstate definition.
    pub fn add_blockstate(
        &mut self,
        namespace: &str,
        block_id: &str,
        definition: BlockstateDefinition,
    ) {
        self.blockstates
            .entry(namespace.to_string())
            .or_default()
            .insert(block_id.to_string(), definition);
    }

    /// Get the total number of blockstate definitions.
    pub fn blockstate_count(&self) -> usize {
        self.blockstates.values().map(|m| m.len()).sum()
    }

    /// Get all namespaces in the resource pack.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<_> = self.blockstates.keys().map(|s| s.as_str()).collect();
        namespaces.sort();
        namespaces
    }
}

impl BlockRegistry for ResourcePack {
    fn has_block(&self, id: &str) -> bool {
        self.get_blockstate(id).is_some()
    }

    fn get_block(&self, id: &str) -> Result<BlockType> {
        let location = ResourceLocation::parse(id);
        let definition = self
            .get_blockstate(id)
            .ok_or_else(|| ArchitectError::id_not_exists(id, &["resource_pack", "blockstates"]))?;
        Ok(BlockType {
            states: definition.states(&location),
            location,
        })
    }

    fn all_blocks(&self) -> Vec<BlockType> {
        let mut blocks: Vec<BlockType> = self
            .blockstates
            .iter()
            .flat_map(|(namespace, defs)| {
                defs.iter().map(move |(path, def)| {
                    let location = ResourceLocation::new(namespace.clone(), path.clone());
                    BlockType {
                        states: def.states(&location),
                        location,
                    }
                })
            })
            .collect();
        blocks.sort_by(|a, b| a.location.cmp(&b.location));
        blocks
    }
}

/// Accepts every id as a single-state block. Not enumerable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRegistry;

impl BlockRegistry for OpenRegistry {
    fn has_block(&self, _id: &str) -> bool {
        true
    }

    fn get_block(&self, id: &str) -> Result<BlockType> {
        Ok(BlockType::simple(ResourceLocation::parse(id)))
    }

    fn all_blocks(&self) -> Vec<BlockType> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack() -> ResourcePack {
        let mut pack = ResourcePack::new();
        pack.add_blockstate(
            "minecraft",
            "stone",
            serde_json::from_str(r#"{"variants": {"": {"model": "block/stone"}}}"#).unwrap(),
        );
        pack.add_blockstate(
            "minecraft",
            "furnace",
            serde_json::from_str(
                r#"{"variants": {
                    "facing=north,lit=false": {"model": "block/furnace"},
                    "facing=east,lit=false": {"model": "block/furnace", "y": 90}
                }}"#,
            )
            .unwrap(),
        );
        pack
    }

    #[test]
    fn test_lookup_defaults_namespace() {
        let pack = pack();
        assert!(pack.has_block("stone"));
        assert!(pack.has_block("minecraft:stone"));
        assert!(!pack.has_block("mymod:stone"));
        assert_eq!(pack.get_block("stone").unwrap().default_state(), Block::new("stone"));
    }

    #[test]
    fn test_missing_block_is_lookup_error() {
        let err = pack().get_block("minecraft:missing").unwrap_err();
        assert!(err.is_lookup());
        assert!(err.to_string().contains("minecraft:missing"));
        assert!(err.to_string().contains("resource_pack/blockstates"));
    }

    #[test]
    fn test_states_carry_properties() {
        let furnace = pack().get_block("furnace").unwrap();
        assert_eq!(furnace.states.len(), 2);
        assert_eq!(
            furnace.default_state().state_key(),
            "minecraft:furnace[facing=east,lit=false]"
        );
    }

    #[test]
    fn test_all_blocks_sorted() {
        let all = pack().all_blocks();
        let names: Vec<_> = all.iter().map(|b| b.location.to_string()).collect();
        assert_eq!(names, vec!["minecraft:furnace", "minecraft:stone"]);
    }

    #[test]
    fn test_open_registry() {
        let registry = OpenRegistry;
        assert!(registry.has_block("anything"));
        assert_eq!(
            registry.get_block("mymod:thing").unwrap().default_state().name,
            "mymod:thing"
        );
        assert!(registry.all_blocks().is_empty());
    }
}
