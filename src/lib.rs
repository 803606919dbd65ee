//! # Schematic Architect
//!
//! A Rust library for turning procedural geometry into Minecraft block data.
//!
//! ## Overview
//!
//! Lines, Bezier curves and triangulated solids are rasterized into block
//! positions, painted with materials and stored in a [`Schematic`]. Built
//! schematics export to Sponge `.schem` and structure NBT, or travel as
//! compact binary buffers between processes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schematic_architect::{load_resource_pack, ExportContext, Exporter};
//! use std::sync::Arc;
//!
//! // Blocks are looked up in a resource pack
//! let pack = load_resource_pack("path/to/pack.zip")?;
//! let ctx = ExportContext::new(Arc::new(pack));
//!
//! // Parse an export job and build it
//! let exporter = Exporter::from_json(&std::fs::read_to_string("job.json")?)?;
//! let schem = exporter.to_schem(&ctx)?;
//! std::fs::write("out.schem", schem)?;
//! ```
//!
//! ## Storage
//!
//! Three interchangeable stores implement [`Schematic`]: a nested map
//! ([`NestedSchematic`]), a palette with packed position keys
//! ([`PaletteSchematic`], the default) and a dense region
//! ([`DenseSchematic`]). Pick one through [`ExportConfig::with_schematic_kind`].
//!
//! ## Workers
//!
//! [`transport::ExportWorker`] connects to a job server over a raw socket and
//! answers binary export jobs with the wire form of the built schematic.

pub mod buffer;
pub mod error;
pub mod export;
pub mod exporter;
pub mod geometry;
pub mod resource_pack;
pub mod schematic;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use error::{ArchitectError, Result};
pub use types::{Block, BlockBounds, BlockPosition, Direction, ResourceLocation};
pub use geometry::{ContainmentMode, Geometry, GeometryKind, Line3, Object3, Surface, Vec2, Vec3};
pub use buffer::{BufferValue, Scheme};
pub use schematic::{DenseSchematic, NestedSchematic, PaletteSchematic, Schematic, SchematicKind};
pub use resource_pack::{BlockRegistry, OpenRegistry, ResourcePack};
pub use exporter::{BuilderResult, ExportConfig, ExportContext, Exporter, Material, MaterialReference};
pub use export::{read_schem, to_nbt, to_schem};

/// Load a resource pack from a file path (ZIP or directory).
pub fn load_resource_pack<P: AsRef<std::path::Path>>(path: P) -> Result<ResourcePack> {
    resource_pack::loader::load_from_path(path)
}

/// Load a resource pack from ZIP bytes.
pub fn load_resource_pack_from_bytes(data: &[u8]) -> Result<ResourcePack> {
    resource_pack::loader::load_from_bytes(data)
}
