//! Resource pack loading from ZIP files and directories.

use super::{BlockstateDefinition, ResourcePack};
use crate::error::{ArchitectError, Result};
use std::io::Read;
use std::path::Path;

/// Load a resource pack from a file path.
///
/// Supports both ZIP files and directories.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ResourcePack> {
    let path = path.as_ref();

    if path.is_dir() {
        load_from_directory(path)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a resource pack from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<ResourcePack> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut pack = ResourcePack::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let file_path = file.name().to_string();

        let Some((namespace, "blockstates", asset_path)) = parse_asset_path(&file_path) else {
            continue;
        };
        let Some(block_id) = asset_path.strip_suffix(".json") else {
            continue;
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        add_parsed(&mut pack, namespace, block_id, &contents);
    }

    log::debug!(
        "loaded {} blockstates from archive of {} entries",
        pack.blockstate_count(),
        archive.len()
    );
    Ok(pack)
}

/// Load a resource pack from a directory.
fn load_from_directory(path: &Path) -> Result<ResourcePack> {
    let mut pack = ResourcePack::new();

    let assets_path = path.join("assets");
    if !assets_path.exists() {
        return Err(ArchitectError::InvalidResourcePack(format!(
            "No assets directory found in {}",
            path.display()
        )));
    }

    for namespace_entry in std::fs::read_dir(&assets_path)? {
        let namespace_entry = namespace_entry?;
        if !namespace_entry.file_type()?.is_dir() {
            continue;
        }

        let namespace = namespace_entry.file_name().to_string_lossy().to_string();
        let blockstates_path = namespace_entry.path().join("blockstates");
        if !blockstates_path.exists() {
            continue;
        }

        for entry in std::fs::read_dir(&blockstates_path)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            let Some(block_id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let contents = std::fs::read_to_string(&path)?;
            add_parsed(&mut pack, &namespace, &block_id, &contents);
        }
    }

    log::debug!(
        "loaded {} blockstates from {}",
        pack.blockstate_count(),
        path.display()
    );
    Ok(pack)
}

fn add_parsed(pack: &mut ResourcePack, namespace: &str, block_id: &str, contents: &str) {
    match serde_json::from_str::<BlockstateDefinition>(contents) {
        Ok(def) => pack.add_blockstate(namespace, block_id, def),
        Err(e) => log::warn!("skipping blockstate {}:{}: {}", namespace, block_id, e),
    }
}

/// Parse an asset path from a ZIP file.
/// Returns (namespace, asset_type, asset_path) if valid.
fn parse_asset_path(file_path: &str) -> Option<(&str, &str, &str)> {
    // Expected format: assets/{namespace}/{type}/{path}
    let parts: Vec<&str> = file_path.splitn(4, '/').collect();

    if parts.len() >= 4 && parts[0] == "assets" {
        Some((parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::BlockRegistry;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const STONE: &str = r#"{"variants": {"": {"model": "block/stone"}}}"#;

    #[test]
    fn test_parse_asset_path() {
        assert_eq!(
            parse_asset_path("assets/minecraft/blockstates/stone.json"),
            Some(("minecraft", "blockstates", "stone.json"))
        );
        assert_eq!(
            parse_asset_path("assets/minecraft/models/block/stone.json"),
            Some(("minecraft", "models", "block/stone.json"))
        );
        assert_eq!(parse_asset_path("pack.mcmeta"), None);
        assert_eq!(parse_asset_path("data/minecraft/recipes/test.json"), None);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blockstates = dir.path().join("assets/minecraft/blockstates");
        std::fs::create_dir_all(&blockstates).unwrap();
        std::fs::write(blockstates.join("stone.json"), STONE).unwrap();
        std::fs::write(blockstates.join("broken.json"), "{ not json").unwrap();
        std::fs::write(blockstates.join("notes.txt"), "ignored").unwrap();

        let pack = load_from_path(dir.path()).unwrap();
        assert_eq!(pack.blockstate_count(), 1);
        assert!(pack.has_block("minecraft:stone"));
        assert!(!pack.has_block("minecraft:broken"));
    }

    #[test]
    fn test_directory_without_assets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from_path(dir.path()),
            Err(ArchitectError::InvalidResourcePack(_))
        ));
    }

    #[test]
    fn test_load_from_zip() {
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let options = SimpleFileOptions::default();
            zip.start_file("assets/mymod/blockstates/marble.json", options).unwrap();
            zip.write_all(STONE.as_bytes()).unwrap();
            zip.start_file("assets/mymod/models/block/marble.json", options).unwrap();
            zip.write_all(b"{}").unwrap();
            zip.finish().unwrap();
        }

        let pack = load_from_bytes(buf.get_ref()).unwrap();
        assert_eq!(pack.namespaces(), vec!["mymod"]);
        assert_eq!(pack.blockstate_count(), 1);
        assert!(pack.get_block("mymod:marble").is_ok());
    }
}
