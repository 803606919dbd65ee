//! Binary material results, the job payload of the worker transport.
//!
//! A job is a list of `{geo, random, data}` records: `geo` is a keyed union
//! (`line3`, `surface`, `object`) over integer coordinates, `random` the
//! material kind id and `data` the material data as JSON text.

use super::material::Material;
use crate::buffer::{BufferValue, Scheme};
use crate::error::{ArchitectError, Result};
use crate::geometry::{Geometry, Line3, Object3, Surface, Vec3};

const LINE_KEY: &str = "line3";
const SURFACE_KEY: &str = "surface";
const OBJECT_KEY: &str = "object";

/// One piece of geometry with the material it is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialResult {
    pub geometry: Geometry,
    pub material: Material,
}

fn point_scheme() -> Scheme {
    Scheme::fixed_list(Scheme::Int, 3)
}

fn mesh_scheme() -> Scheme {
    Scheme::object([
        ("vertices", Scheme::list(point_scheme())),
        ("triangles", Scheme::list(Scheme::fixed_list(Scheme::Int, 3))),
    ])
}

pub fn results_scheme() -> Scheme {
    Scheme::list(Scheme::object([
        (
            "geo",
            Scheme::keyed([
                (LINE_KEY, Scheme::list(Scheme::list(point_scheme()))),
                (SURFACE_KEY, mesh_scheme()),
                (OBJECT_KEY, mesh_scheme()),
            ]),
        ),
        ("random", Scheme::String),
        ("data", Scheme::String),
    ]))
}

/// Coordinates travel as whole blocks; fractions are rounded.
fn point_value(point: Vec3) -> BufferValue {
    let p = point.round();
    BufferValue::int_list([p.x as i32, p.y as i32, p.z as i32])
}

fn read_point(value: &BufferValue) -> Result<Vec3> {
    match value.to_ints()?.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x as f64, *y as f64, *z as f64)),
        other => Err(ArchitectError::SchemeMismatch(format!("point {:?}", other))),
    }
}

fn mesh_value(vertices: &[Vec3], triangles: &[[usize; 3]]) -> Result<BufferValue> {
    let triangles = triangles
        .iter()
        .map(|triangle| -> Result<BufferValue> {
            let ints = triangle
                .iter()
                .map(|i| {
                    i32::try_from(*i).map_err(|_| {
                        ArchitectError::SchemeMismatch(format!("vertex index {}", i))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(BufferValue::int_list(ints))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BufferValue::object([
        (
            "vertices",
            BufferValue::List(vertices.iter().copied().map(point_value).collect()),
        ),
        ("triangles", BufferValue::List(triangles)),
    ]))
}

fn read_mesh(value: &BufferValue) -> Result<(Vec<Vec3>, Vec<[usize; 3]>)> {
    let vertices = value
        .field("vertices")?
        .as_list()?
        .iter()
        .map(read_point)
        .collect::<Result<Vec<_>>>()?;
    let triangles = value
        .field("triangles")?
        .as_list()?
        .iter()
        .map(|triangle| -> Result<[usize; 3]> {
            let mut out = [0usize; 3];
            let ints = triangle.to_ints()?;
            if ints.len() != 3 {
                return Err(ArchitectError::SchemeMismatch(format!("triangle {:?}", ints)));
            }
            for (slot, i) in out.iter_mut().zip(ints) {
                *slot = usize::try_from(i).map_err(|_| {
                    ArchitectError::SchemeMismatch(format!("vertex index {}", i))
                })?;
            }
            Ok(out)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((vertices, triangles))
}

fn geometry_value(geometry: &Geometry) -> Result<BufferValue> {
    Ok(match geometry {
        Geometry::Line(line) => BufferValue::keyed(
            LINE_KEY,
            BufferValue::List(
                line.parts()
                    .iter()
                    .map(|part| {
                        BufferValue::List(part.controls().into_iter().map(point_value).collect())
                    })
                    .collect(),
            ),
        ),
        Geometry::Surface(surface) => BufferValue::keyed(
            SURFACE_KEY,
            mesh_value(surface.vertices(), surface.triangles())?,
        ),
        Geometry::Object(object) => BufferValue::keyed(
            OBJECT_KEY,
            mesh_value(object.vertices(), object.triangles())?,
        ),
    })
}

fn read_geometry(value: &BufferValue) -> Result<Geometry> {
    let (key, value) = value.as_keyed()?;
    match key {
        LINE_KEY => {
            let parts = value
                .as_list()?
                .iter()
                .map(|part| -> Result<Vec<Vec3>> {
                    part.as_list()?.iter().map(read_point).collect()
                })
                .collect::<Result<Vec<Vec<Vec3>>>>()?;
            Ok(Geometry::Line(Line3::try_from(parts)?))
        }
        SURFACE_KEY => {
            let (vertices, triangles) = read_mesh(value)?;
            Ok(Geometry::Surface(Surface::new(vertices, triangles)?))
        }
        OBJECT_KEY => {
            let (vertices, triangles) = read_mesh(value)?;
            Ok(Geometry::Object(Object3::new(vertices, triangles)?))
        }
        other => Err(ArchitectError::UnknownKey(other.to_string())),
    }
}

pub fn encode_results(results: &[MaterialResult]) -> Result<Vec<u8>> {
    let value = BufferValue::List(
        results
            .iter()
            .map(|result| -> Result<BufferValue> {
                Ok(BufferValue::object([
                    ("geo", geometry_value(&result.geometry)?),
                    ("random", BufferValue::from(result.material.kind().id())),
                    ("data", BufferValue::String(result.material.data()?.to_string())),
                ]))
            })
            .collect::<Result<Vec<_>>>()?,
    );
    results_scheme().write_all(&value)
}

/// Decode a job payload starting at `offset`.
pub fn decode_results(data: &[u8], offset: usize) -> Result<Vec<MaterialResult>> {
    let (value, _) = results_scheme().read(data, offset)?;
    value
        .as_list()?
        .iter()
        .map(|record| -> Result<MaterialResult> {
            let geometry = read_geometry(record.field("geo")?)?;
            let data: serde_json::Value = serde_json::from_str(record.field("data")?.as_str()?)?;
            let material = Material::from_parts(record.field("random")?.as_str()?, data)?;
            Ok(MaterialResult { geometry, material })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::material::WeightedBlock;
    use crate::geometry::{Line3Part, Segment3};

    fn results() -> Vec<MaterialResult> {
        vec![
            MaterialResult {
                geometry: Geometry::Object(Object3::cuboid(Vec3::ZERO, Vec3::new(2.0, 3.0, 2.0))),
                material: Material::Constant("minecraft:stone".into()),
            },
            MaterialResult {
                geometry: Geometry::Line(Line3::new(vec![
                    Line3Part::Segment(Segment3::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0))),
                    Line3Part::from_points(vec![
                        Vec3::new(4.0, 0.0, 0.0),
                        Vec3::new(6.0, 2.0, 0.0),
                        Vec3::new(8.0, 0.0, 0.0),
                    ])
                    .unwrap(),
                ])),
                material: Material::Weighted(vec![
                    WeightedBlock::new("minecraft:dirt", 2.0),
                    WeightedBlock::new("minecraft:gravel", 1.0),
                ]),
            },
            MaterialResult {
                geometry: Geometry::Surface(
                    Surface::new(
                        vec![Vec3::ZERO, Vec3::X, Vec3::Z],
                        vec![[0, 1, 2]],
                    )
                    .unwrap(),
                ),
                material: Material::Constant("minecraft:glass".into()),
            },
        ]
    }

    #[test]
    fn test_records_survive_encoding() {
        let bytes = encode_results(&results()).unwrap();
        assert_eq!(decode_results(&bytes, 0).unwrap(), results());
    }

    #[test]
    fn test_decode_at_offset() {
        let mut bytes = vec![0xaa; 9];
        bytes.extend(encode_results(&results()[..1]).unwrap());
        let decoded = decode_results(&bytes, 9).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].material, Material::Constant("minecraft:stone".into()));
    }

    #[test]
    fn test_fractional_points_are_rounded() {
        let result = MaterialResult {
            geometry: Geometry::Line(Line3::new(vec![Line3Part::Segment(Segment3::new(
                Vec3::new(0.4, 1.6, -2.5),
                Vec3::new(3.0, 0.0, 0.0),
            ))])),
            material: Material::Constant("stone".into()),
        };
        let decoded = decode_results(&encode_results(&[result]).unwrap(), 0).unwrap();
        let Geometry::Line(line) = &decoded[0].geometry else {
            panic!("expected a line");
        };
        assert_eq!(line.parts()[0].controls()[0], Vec3::new(0.0, 2.0, -3.0));
    }

    #[test]
    fn test_unknown_material_kind() {
        let value = BufferValue::List(vec![BufferValue::object([
            ("geo", geometry_value(&results()[0].geometry).unwrap()),
            ("random", BufferValue::from("c_item")),
            ("data", BufferValue::from("\"minecraft:diamond\"")),
        ])]);
        let bytes = results_scheme().write_all(&value).unwrap();
        assert!(matches!(
            decode_results(&bytes, 0),
            Err(ArchitectError::KeyNotRegistered { .. })
        ));
    }

    #[test]
    fn test_bad_triangle_index() {
        let value = BufferValue::List(vec![BufferValue::object([
            (
                "geo",
                BufferValue::keyed(
                    OBJECT_KEY,
                    BufferValue::object([
                        ("vertices", BufferValue::List(vec![point_value(Vec3::ZERO)])),
                        ("triangles", BufferValue::List(vec![BufferValue::int_list([0, 0, 5])])),
                    ]),
                ),
            ),
            ("random", BufferValue::from("c_block")),
            ("data", BufferValue::from("\"stone\"")),
        ])]);
        let bytes = results_scheme().write_all(&value).unwrap();
        assert!(matches!(
            decode_results(&bytes, 0),
            Err(ArchitectError::InvalidGeometry(_))
        ));
    }
}
