use std::io::{BufRead, Read};
use std::path::Path;

use super::{
    properties::{PlyDataType, PlyPropertyDefinition, PlySchema},
    PlyError,
};
use crate::pointcloud::PointCloud;

/// The parsed header of a binary little endian PLY file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    /// Number of vertices announced by `element vertex`.
    pub vertex_count: usize,
    /// Vertex properties in file order.
    pub schema: PlySchema,
}

pub(crate) fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut vertex_count = None;
    let mut is_binary_little_endian = false;
    let mut is_ply = false;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::UnsupportedHeader("missing end_header".into()));
        }
        let trimmed = line.trim();

        if trimmed == "ply" {
            is_ply = true;
            continue;
        }

        if trimmed == "end_header" {
            break;
        }

        let parts = trimmed.split_whitespace().collect::<Vec<_>>();
        match parts.as_slice() {
            ["format", "binary_little_endian", ..] => is_binary_little_endian = true,
            ["element", "vertex", count] => {
                in_vertex_element = true;
                vertex_count = Some(count.parse::<usize>().map_err(|_| {
                    PlyError::UnsupportedHeader(format!("bad vertex count {count}"))
                })?);
            }
            ["element", ..] => in_vertex_element = false,
            ["property", "list", ..] if in_vertex_element => {
                return Err(PlyError::UnsupportedProperty("list".into()));
            }
            ["property", data_type, name] if in_vertex_element => {
                properties.push(PlyPropertyDefinition {
                    name: name.to_string(),
                    data_type: PlyDataType::parse(data_type)?,
                });
            }
            _ => {}
        }
    }

    if !is_ply {
        return Err(PlyError::UnsupportedHeader("not a ply file".into()));
    }
    if !is_binary_little_endian {
        return Err(PlyError::UnsupportedHeader(
            "only binary_little_endian is supported".into(),
        ));
    }

    let vertex_count =
        vertex_count.ok_or_else(|| PlyError::UnsupportedHeader("no vertex element".into()))?;

    Ok(PlyHeader {
        vertex_count,
        schema: PlySchema { properties },
    })
}

/// Read only the header of a binary PLY file.
pub fn read_ply_header(path: impl AsRef<Path>) -> Result<PlyHeader, PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    parse_header(&mut reader)
}

/// Read the header and the raw binary body that follows `end_header`.
pub fn read_ply_body(path: impl AsRef<Path>) -> Result<(PlyHeader, Vec<u8>), PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let header = parse_header(&mut reader)?;
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    Ok((header, body))
}

/// Read the geometry of a binary PLY file.
///
/// Points are always read. Colors are read when the schema has `red`,
/// `green`, `blue` and normals when it has `nx`, `ny`, `nz`. Any other
/// property is skipped.
pub fn read_ply_binary(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let header = parse_header(&mut reader)?;
    let schema = &header.schema;
    let mut buffer = vec![0u8; schema.record_size()];

    let has_colors = ["red", "green", "blue"].iter().all(|n| schema.has(n));
    let has_normals = ["nx", "ny", "nz"].iter().all(|n| schema.has(n));

    let mut points = Vec::with_capacity(header.vertex_count);
    let mut colors = Vec::with_capacity(if has_colors { header.vertex_count } else { 0 });
    let mut normals = Vec::with_capacity(if has_normals { header.vertex_count } else { 0 });

    for _ in 0..header.vertex_count {
        reader.read_exact(&mut buffer)?;
        points.push(schema.read_point(&buffer));
        if has_colors {
            colors.push(schema.read_color(&buffer));
        }
        if has_normals {
            normals.push(schema.read_normal(&buffer));
        }
    }

    Ok(PointCloud::new(
        points,
        has_colors.then_some(colors),
        has_normals.then_some(normals),
    ))
}
