//! Blockstate definition parsing.
//!
//! Blockstates define which property combinations a block accepts.
//! There are two formats: "variants" and "multipart". Only the variant keys
//! are kept; placement needs the states, not the models.

use crate::types::{Block, ResourceLocation};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A blockstate definition from blockstates/*.json.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockstateDefinition {
    /// Variant keys such as `facing=north,half=bottom`, sorted.
    Variants(Vec<String>),
    /// Conditional model application. States are not enumerable.
    Multipart,
}

impl<'de> Deserialize<'de> for BlockstateDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawBlockstate {
            variants: Option<BTreeMap<String, IgnoredAny>>,
            multipart: Option<IgnoredAny>,
        }

        let raw = RawBlockstate::deserialize(deserializer)?;

        if let Some(variants) = raw.variants {
            Ok(BlockstateDefinition::Variants(variants.into_keys().collect()))
        } else if raw.multipart.is_some() {
            Ok(BlockstateDefinition::Multipart)
        } else {
            Ok(BlockstateDefinition::Variants(Vec::new()))
        }
    }
}

impl BlockstateDefinition {
    /// The placeable states of the block at `location`.
    ///
    /// Variants give one state per variant key. Multipart blocks give the
    /// bare block.
    pub fn states(&self, location: &ResourceLocation) -> Vec<Block> {
        let name = location.to_string();
        match self {
            BlockstateDefinition::Variants(keys) if !keys.is_empty() => keys
                .iter()
                .map(|key| Block {
                    properties: parse_variant_key(key),
                    ..Block::new(&name)
                })
                .collect(),
            _ => vec![Block::new(&name)],
        }
    }
}

/// `facing=north,half=bottom` -> `{facing: north, half: bottom}`. The empty key
/// matches every state.
pub fn parse_variant_key(key: &str) -> BTreeMap<String, String> {
    key.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
