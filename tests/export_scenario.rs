//! End-to-end: JSON job in, gzipped Sponge schematic out.

use fastnbt::Value;
use flate2::read::GzDecoder;
use schematic_architect::{
    ExportConfig, ExportContext, Exporter, OpenRegistry, ResourcePack, SchematicKind,
};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

const UNIT_CUBE: &str = r#"{
    "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0],[0,0,1],[1,0,1],[1,1,1],[0,1,1]],
    "triangles": [[0,1,2],[0,2,3],[4,6,5],[4,7,6],[0,4,5],[0,5,1],
                  [3,2,6],[3,6,7],[0,3,7],[0,7,4],[1,5,6],[1,6,2]]
}"#;

fn cube_job() -> Exporter {
    let json = format!(
        r#"{{
            "seed": 1,
            "result": {{
                "type": "object",
                "object": {},
                "material": {{"defined": {{"type": "c_block", "data": "minecraft:stone"}}}},
                "children": []
            }},
            "materials": []
        }}"#,
        UNIT_CUBE
    );
    Exporter::from_json(&json).unwrap()
}

fn root_compound(schem: &[u8]) -> HashMap<String, Value> {
    let mut nbt = Vec::new();
    GzDecoder::new(schem).read_to_end(&mut nbt).unwrap();
    fastnbt::from_bytes(&nbt).unwrap()
}

#[test]
fn test_unit_cube_to_schem() {
    let ctx = ExportContext::new(Arc::new(OpenRegistry));
    let schem = cube_job().to_schem(&ctx).unwrap();
    assert_eq!(&schem[..2], &[0x1f, 0x8b]);

    let root = root_compound(&schem);
    assert_eq!(root["Width"], Value::Short(1));
    assert_eq!(root["Height"], Value::Short(1));
    assert_eq!(root["Length"], Value::Short(1));

    let Value::Compound(palette) = &root["Palette"] else {
        panic!("palette is not a compound: {:?}", root["Palette"]);
    };
    assert_eq!(palette.len(), 2);
    assert_eq!(palette["minecraft:air"], Value::Int(0));
    assert_eq!(palette["minecraft:stone"], Value::Int(1));

    let Value::ByteArray(data) = &root["BlockData"] else {
        panic!("block data is not a byte array: {:?}", root["BlockData"]);
    };
    assert_eq!(data.iter().copied().collect::<Vec<i8>>(), vec![1]);
}

#[test]
fn test_every_store_exports_the_same() {
    let schem_for = |kind| {
        let ctx = ExportContext::new(Arc::new(OpenRegistry))
            .with_config(ExportConfig::default().with_schematic_kind(kind));
        cube_job().to_schem(&ctx).unwrap()
    };
    let palette = root_compound(&schem_for(SchematicKind::Palette));
    let nested = root_compound(&schem_for(SchematicKind::Nested));
    assert_eq!(palette["BlockData"], nested["BlockData"]);
    assert_eq!(palette["Palette"], nested["Palette"]);
}

#[test]
fn test_unknown_block_fails_the_job() {
    let ctx = ExportContext::new(Arc::new(ResourcePack::new()));
    let err = cube_job().to_schem(&ctx).unwrap_err();
    assert!(err.is_lookup());
    assert!(err.to_string().contains("minecraft:stone"));
}
