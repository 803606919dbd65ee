//! Building schematics from a geometry tree.
//!
//! An export job is a [`BuilderResult`] tree: every node carries one piece of
//! geometry, an optional material and its children. [`Exporter::build`] walks
//! the tree depth first into a single schematic, so a child overwrites its
//! parent where both place a block.
//!
//! Everything a job needs travels in an [`ExportContext`]: the block registry
//! and the [`ExportConfig`]. The random state is created per build from the
//! job seed; nothing is shared between jobs.
//!
//! ```
//! use std::sync::Arc;
//! use schematic_architect::exporter::{BuilderResult, ExportContext, Exporter, Material, MaterialReference};
//! use schematic_architect::geometry::{Geometry, Object3, Vec3};
//! use schematic_architect::resource_pack::OpenRegistry;
//! use schematic_architect::schematic::Schematic;
//!
//! let cube = BuilderResult::new(Geometry::Object(Object3::cuboid(Vec3::ZERO, Vec3::ONE)))
//!     .with_material(MaterialReference::defined(Material::Constant("minecraft:stone".into())));
//! let exporter = Exporter::new(cube).with_seed(1);
//! let schematic = exporter.build(&ExportContext::new(Arc::new(OpenRegistry))).unwrap();
//! assert_eq!(schematic.len(), 1);
//! ```

pub mod config;
pub mod material;
pub mod random;
pub mod records;

pub use config::{ExportConfig, DATA_VERSION_ENV, DEFAULT_DATA_VERSION};
pub use material::{Material, MaterialKind, MaterialReference, Painter, WeightedBlock};
pub use random::ExportRng;
pub use records::{decode_results, encode_results, MaterialResult};

use crate::error::{ArchitectError, Result};
use crate::export;
use crate::geometry::{Geometry, GeometryKind};
use crate::resource_pack::BlockRegistry;
use crate::schematic::Schematic;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Collaborators and settings of export jobs.
#[derive(Clone)]
pub struct ExportContext {
    registry: Arc<dyn BlockRegistry>,
    config: ExportConfig,
}

impl ExportContext {
    pub fn new(registry: Arc<dyn BlockRegistry>) -> Self {
        Self {
            registry,
            config: ExportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &dyn BlockRegistry {
        self.registry.as_ref()
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn check_deadline(&self) -> Result<()> {
        if self.config.deadline_passed() {
            return Err(ArchitectError::DeadlineExceeded);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ExportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Place `material` on every cell of `geometry`. Returns the number of cells set.
///
/// Lines are sampled with the configured Bezier precision. Surfaces cannot be
/// rasterized yet; they are logged and contribute nothing.
pub fn apply_material(
    geometry: &Geometry,
    material: &Material,
    schematic: &mut dyn Schematic,
    ctx: &ExportContext,
    rng: &mut ExportRng,
) -> Result<usize> {
    // unknown blocks fail the job even where nothing gets placed
    let painter = material.painter(ctx.registry())?;
    let cells = match geometry {
        Geometry::Line(line) => line
            .clone()
            .with_precision(ctx.config.bezier_precision)
            .blocks(),
        other => match other.blocks(ctx.config.containment) {
            Ok(cells) => cells,
            Err(ArchitectError::Unsupported(what)) => {
                log::warn!("skipping {} node: {}", other.kind().as_str(), what);
                return Ok(0);
            }
            Err(e) => return Err(e),
        },
    };

    for pos in &cells {
        schematic.set_block(*pos, painter.pick(rng))?;
    }
    Ok(cells.len())
}

/// Build a flat list of material results into `schematic`, in order.
pub fn build_results(
    results: &[MaterialResult],
    schematic: &mut dyn Schematic,
    ctx: &ExportContext,
    rng: &mut ExportRng,
) -> Result<usize> {
    let mut placed = 0;
    for result in results {
        ctx.check_deadline()?;
        placed += apply_material(&result.geometry, &result.material, schematic, ctx, rng)?;
    }
    Ok(placed)
}

/// One node of the geometry tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBuilderResult")]
pub struct BuilderResult {
    pub geometry: Geometry,
    pub material: Option<MaterialReference>,
    pub children: Vec<BuilderResult>,
}

#[derive(Deserialize)]
struct RawBuilderResult {
    #[serde(rename = "type")]
    kind: GeometryKind,
    object: serde_json::Value,
    #[serde(default)]
    material: Option<MaterialReference>,
    #[serde(default)]
    children: Vec<BuilderResult>,
}

impl TryFrom<RawBuilderResult> for BuilderResult {
    type Error = ArchitectError;

    fn try_from(raw: RawBuilderResult) -> Result<Self> {
        Ok(Self {
            geometry: Geometry::from_json(raw.kind, raw.object)?,
            material: raw.material,
            children: raw.children,
        })
    }
}

impl Serialize for BuilderResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BuilderResult", 4)?;
        state.serialize_field("type", &self.geometry.kind())?;
        match &self.geometry {
            Geometry::Line(line) => state.serialize_field("object", line)?,
            Geometry::Surface(surface) => state.serialize_field("object", surface)?,
            Geometry::Object(object) => state.serialize_field("object", object)?,
        }
        match &self.material {
            Some(material) => state.serialize_field("material", material)?,
            None => state.skip_field("material")?,
        }
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}

impl BuilderResult {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            material: None,
            children: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: MaterialReference) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_child(mut self, child: BuilderResult) -> Self {
        self.children.push(child);
        self
    }

    /// Nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BuilderResult::node_count).sum::<usize>()
    }

    /// Build this node, then its children, into `schematic`.
    pub fn build_into(
        &self,
        schematic: &mut dyn Schematic,
        materials: &HashMap<String, Material>,
        ctx: &ExportContext,
        rng: &mut ExportRng,
    ) -> Result<()> {
        ctx.check_deadline()?;
        if let Some(reference) = &self.material {
            let material = reference.resolve(materials)?;
            apply_material(&self.geometry, material, schematic, ctx, rng)?;
        }
        for child in &self.children {
            child.build_into(schematic, materials, ctx, rng)?;
        }
        Ok(())
    }
}

/// `{id, data}` entry of the job's material table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MaterialEntry {
    id: String,
    data: Material,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawExporter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    result: BuilderResult,
    #[serde(default)]
    materials: Vec<MaterialEntry>,
}

/// A complete export job: seed, geometry tree and named materials.
///
/// JSON form: `{"seed": 42, "result": <BuilderResult>, "materials": [{"id", "data"}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExporter", into = "RawExporter")]
pub struct Exporter {
    /// Without a seed every build draws a fresh one.
    pub seed: Option<u64>,
    pub result: BuilderResult,
    pub materials: HashMap<String, Material>,
}

impl From<RawExporter> for Exporter {
    fn from(raw: RawExporter) -> Self {
        Self {
            seed: raw.seed,
            result: raw.result,
            materials: raw.materials.into_iter().map(|e| (e.id, e.data)).collect(),
        }
    }
}

impl From<Exporter> for RawExporter {
    fn from(exporter: Exporter) -> Self {
        let mut materials: Vec<MaterialEntry> = exporter
            .materials
            .into_iter()
            .map(|(id, data)| MaterialEntry { id, data })
            .collect();
        materials.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            seed: exporter.seed,
            result: exporter.result,
            materials,
        }
    }
}

impl Exporter {
    pub fn new(result: BuilderResult) -> Self {
        Self {
            seed: None,
            result,
            materials: HashMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_material(mut self, id: impl Into<String>, material: Material) -> Self {
        self.materials.insert(id.into(), material);
        self
    }

    /// Build the tree into a fresh store of the configured kind.
    pub fn build(&self, ctx: &ExportContext) -> Result<Box<dyn Schematic>> {
        let start = Instant::now();
        let mut rng = match self.seed {
            Some(seed) => ExportRng::new(seed),
            None => ExportRng::from_entropy(),
        };
        let mut schematic = ctx.config.schematic_kind.create()?;
        self.result
            .build_into(schematic.as_mut(), &self.materials, ctx, &mut rng)?;
        log::debug!(
            "built {} blocks from {} nodes into a {} schematic (seed {}) in {:?}",
            schematic.len(),
            self.result.node_count(),
            ctx.config.schematic_kind.name(),
            rng.seed(),
            start.elapsed()
        );
        Ok(schematic)
    }

    /// Build, then export as gzipped Sponge `.schem`.
    pub fn to_schem(&self, ctx: &ExportContext) -> Result<Vec<u8>> {
        let schematic = self.build(ctx)?;
        export::to_schem(schematic.as_ref(), ctx.config.data_version)
    }

    /// Build, then export as gzipped structure NBT.
    pub fn to_nbt(&self, ctx: &ExportContext) -> Result<Vec<u8>> {
        let schematic = self.build(ctx)?;
        export::to_nbt(schematic.as_ref(), ctx.config.data_version)
    }
}
