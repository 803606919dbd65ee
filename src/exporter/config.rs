//! Export configuration.

use crate::geometry::{ContainmentMode, DEFAULT_BEZIER_PRECISION};
use crate::schematic::SchematicKind;
use std::time::{Duration, Instant};

/// Minecraft 1.20.1.
pub const DEFAULT_DATA_VERSION: i32 = 3465;

/// Environment variable read by [`ExportConfig::from_env`].
pub const DATA_VERSION_ENV: &str = "MC_DATA_VERSION";

/// Configuration for building and exporting schematics.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Store used for the built schematic.
    pub schematic_kind: SchematicKind,
    /// How solids decide which cells are inside.
    pub containment: ContainmentMode,
    /// Samples per Bezier curve when rasterizing lines.
    pub bezier_precision: usize,
    /// `DataVersion` written into NBT exports.
    pub data_version: i32,
    /// Abort a build that runs past this instant.
    pub deadline: Option<Instant>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schematic_kind: SchematicKind::default(),
            containment: ContainmentMode::default(),
            bezier_precision: DEFAULT_BEZIER_PRECISION,
            data_version: DEFAULT_DATA_VERSION,
            deadline: None,
        }
    }
}

impl ExportConfig {
    /// Defaults, with the data version taken from `MC_DATA_VERSION` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(DATA_VERSION_ENV) {
            match value.trim().parse() {
                Ok(version) => config.data_version = version,
                Err(e) => log::warn!("ignoring {}={:?}: {}", DATA_VERSION_ENV, value, e),
            }
        }
        config
    }

    pub fn with_schematic_kind(mut self, kind: SchematicKind) -> Self {
        self.schematic_kind = kind;
        self
    }

    pub fn with_containment(mut self, containment: ContainmentMode) -> Self {
        self.containment = containment;
        self
    }

    pub fn with_bezier_precision(mut self, precision: usize) -> Self {
        self.bezier_precision = precision.max(1);
        self
    }

    pub fn with_data_version(mut self, data_version: i32) -> Self {
        self.data_version = data_version;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.schematic_kind, SchematicKind::Palette);
        assert_eq!(config.containment, ContainmentMode::AnyHit);
        assert_eq!(config.bezier_precision, 50);
        assert_eq!(config.data_version, 3465);
        assert!(!config.deadline_passed());
    }

    #[test]
    fn test_builders() {
        let config = ExportConfig::default()
            .with_schematic_kind(SchematicKind::Nested)
            .with_containment(ContainmentMode::Parity)
            .with_bezier_precision(0)
            .with_data_version(3700);
        assert_eq!(config.schematic_kind, SchematicKind::Nested);
        assert_eq!(config.containment, ContainmentMode::Parity);
        assert_eq!(config.bezier_precision, 1);
        assert_eq!(config.data_version, 3700);
    }

    #[test]
    fn test_past_deadline() {
        let config = ExportConfig::default().with_deadline(Instant::now());
        assert!(config.deadline_passed());
        let config = ExportConfig::default().with_timeout(Duration::from_secs(3600));
        assert!(!config.deadline_passed());
    }
}
