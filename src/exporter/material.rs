//! Materials: how a piece of geometry picks its blocks.

use super::random::ExportRng;
use crate::error::{ArchitectError, Result};
use crate::resource_pack::BlockRegistry;
use crate::types::Block;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One weighted choice of a [`Material::Weighted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedBlock {
    pub id: String,
    pub weight: f64,
}

impl WeightedBlock {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Block selection for a geometry node.
///
/// JSON form: `{"type": "c_block", "data": "minecraft:stone"}` or
/// `{"type": "block", "data": [{"id": "minecraft:stone", "weight": 3}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Material {
    /// Always the same block.
    #[serde(rename = "c_block")]
    Constant(String),
    /// One choice per block, by weight.
    #[serde(rename = "block")]
    Weighted(Vec<WeightedBlock>),
}

/// Registered material kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Constant,
    Weighted,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 2] = [MaterialKind::Constant, MaterialKind::Weighted];

    pub fn id(&self) -> &'static str {
        match self {
            MaterialKind::Constant => "c_block",
            MaterialKind::Weighted => "block",
        }
    }

    /// Editor template used to fill in the material data.
    pub fn template(&self) -> &'static str {
        match self {
            MaterialKind::Constant => "c_enum",
            MaterialKind::Weighted => "enum",
        }
    }

    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| ArchitectError::key_not_registered(id, &["materials", "kinds"]))
    }
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Constant(_) => MaterialKind::Constant,
            Material::Weighted(_) => MaterialKind::Weighted,
        }
    }

    /// Build from a kind id and its JSON data, as carried by binary records.
    pub fn from_parts(kind_id: &str, data: serde_json::Value) -> Result<Self> {
        Ok(match MaterialKind::from_id(kind_id)? {
            MaterialKind::Constant => Material::Constant(serde_json::from_value(data)?),
            MaterialKind::Weighted => Material::Weighted(serde_json::from_value(data)?),
        })
    }

    /// The JSON data without the kind tag.
    pub fn data(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Material::Constant(id) => serde_json::Value::String(id.clone()),
            Material::Weighted(choices) => serde_json::to_value(choices)?,
        })
    }

    /// Resolve every block id against the registry once.
    pub fn painter(&self, registry: &dyn BlockRegistry) -> Result<Painter> {
        match self {
            Material::Constant(id) => Ok(Painter::Fixed(resolve(registry, id)?)),
            Material::Weighted(choices) => {
                let index = WeightedIndex::new(choices.iter().map(|c| c.weight)).map_err(
                    |e| match e {
                        WeightedError::NoItem => {
                            ArchitectError::ListEmpty("material/block/choices".to_string())
                        }
                        other => ArchitectError::InvalidWeights {
                            path: "material/block/choices".to_string(),
                            reason: other.to_string(),
                        },
                    },
                )?;
                let blocks = choices
                    .iter()
                    .map(|choice| resolve(registry, &choice.id))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Painter::Weighted { blocks, index })
            }
        }
    }

    /// One reproducible pick.
    pub fn seeded(&self, registry: &dyn BlockRegistry, rng: &mut ExportRng) -> Result<Block> {
        Ok(self.painter(registry)?.pick(rng))
    }

    /// One pick from the thread RNG. Not reproducible; exports use [`seeded`](Self::seeded).
    pub fn random(&self, registry: &dyn BlockRegistry) -> Result<Block> {
        Ok(self.painter(registry)?.pick(&mut rand::thread_rng()))
    }
}

fn resolve(registry: &dyn BlockRegistry, id: &str) -> Result<Block> {
    Ok(registry.get_block(id)?.default_state())
}

/// A material with its blocks resolved, ready to pick per cell.
#[derive(Debug, Clone)]
pub enum Painter {
    Fixed(Block),
    Weighted {
        blocks: Vec<Block>,
        index: WeightedIndex<f64>,
    },
}

impl Painter {
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        match self {
            Painter::Fixed(block) => block.clone(),
            Painter::Weighted { blocks, index } => blocks[index.sample(rng)].clone(),
        }
    }
}

/// A node's material: inline, or by reference into the job's material table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined: Option<Material>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl MaterialReference {
    pub fn defined(material: Material) -> Self {
        Self {
            defined: Some(material),
            ..Self::default()
        }
    }

    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            reference: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// The inline material, else the referenced one.
    pub fn resolve<'a>(&'a self, materials: &'a HashMap<String, Material>) -> Result<&'a Material> {
        if let Some(material) = &self.defined {
            return Ok(material);
        }
        let id = self
            .reference
            .as_deref()
            .ok_or_else(|| ArchitectError::id_not_exists("<none>", &["materials"]))?;
        materials
            .get(id)
            .ok_or_else(|| ArchitectError::id_not_exists(id, &["materials"]))
    }
}
