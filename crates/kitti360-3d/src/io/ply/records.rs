use std::path::Path;

use super::{read_ply_body, PlyDataType, PlyError, PlySchema};

/// Per-point attributes stored in the body of a KITTI-360 fused window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    /// Point position in world coordinates.
    pub position: [f32; 3],
    /// Point color.
    pub rgb: [u8; 3],
    /// Semantic label id, 0 when unlabeled.
    pub semantic_id: i32,
    /// Global instance id, `semantic * 1000 + instance`.
    pub global_id: i32,
    /// Frame index of dynamic points, -1 for static ones.
    pub timestamp: i32,
    /// Visibility flag of labeled records.
    pub visible: bool,
    /// Visibility flag of unlabeled records.
    pub visible_raw: bool,
    /// Label confidence, 0 when absent.
    pub confidence: f32,
}

/// The fixed binary layout of the attribute records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// `x y z r g b semantic instance visible confidence`
    LabeledStatic,
    /// `x y z r g b semantic instance visible timestamp confidence`
    LabeledDynamic,
    /// `x y z r g b visible`
    UnlabeledStatic,
    /// `x y z r g b timestamp`
    UnlabeledDynamic,
}

impl RecordLayout {
    /// Pick the layout for a window kind.
    pub fn new(is_labeled: bool, is_dynamic: bool) -> Self {
        match (is_labeled, is_dynamic) {
            (true, false) => RecordLayout::LabeledStatic,
            (true, true) => RecordLayout::LabeledDynamic,
            (false, false) => RecordLayout::UnlabeledStatic,
            (false, true) => RecordLayout::UnlabeledDynamic,
        }
    }

    /// Pick the layout matching the vertex properties of a window.
    ///
    /// Windows are labeled when they carry a `semantic` property and dynamic
    /// when they carry a `timestamp` property.
    pub fn from_schema(schema: &PlySchema) -> Self {
        Self::new(schema.has("semantic"), schema.has("timestamp"))
    }

    /// Size in bytes of one packed record.
    pub fn record_size(&self) -> usize {
        match self {
            RecordLayout::LabeledStatic => 28,
            RecordLayout::LabeledDynamic => 32,
            RecordLayout::UnlabeledStatic => 16,
            RecordLayout::UnlabeledDynamic => 19,
        }
    }

    /// Vertex properties of the layout, in storage order.
    pub fn properties(&self) -> &'static [(&'static str, PlyDataType)] {
        use PlyDataType::{Float32, Int32, UInt8};
        match self {
            RecordLayout::LabeledStatic => &[
                ("x", Float32),
                ("y", Float32),
                ("z", Float32),
                ("red", UInt8),
                ("green", UInt8),
                ("blue", UInt8),
                ("semantic", Int32),
                ("instance", Int32),
                ("visible", UInt8),
                ("confidence", Float32),
            ],
            RecordLayout::LabeledDynamic => &[
                ("x", Float32),
                ("y", Float32),
                ("z", Float32),
                ("red", UInt8),
                ("green", UInt8),
                ("blue", UInt8),
                ("semantic", Int32),
                ("instance", Int32),
                ("visible", UInt8),
                ("timestamp", Int32),
                ("confidence", Float32),
            ],
            RecordLayout::UnlabeledStatic => &[
                ("x", Float32),
                ("y", Float32),
                ("z", Float32),
                ("red", UInt8),
                ("green", UInt8),
                ("blue", UInt8),
                ("visible", UInt8),
            ],
            RecordLayout::UnlabeledDynamic => &[
                ("x", Float32),
                ("y", Float32),
                ("z", Float32),
                ("red", UInt8),
                ("green", UInt8),
                ("blue", UInt8),
                ("timestamp", Int32),
            ],
        }
    }

    /// Check that the header lists exactly the properties of the layout, with
    /// the same names, types and order.
    pub fn check_schema(&self, schema: &PlySchema) -> Result<(), PlyError> {
        let expected = self.properties();
        if schema.properties.len() != expected.len() {
            return Err(PlyError::SchemaMismatch(format!(
                "expected {} properties for {self:?}, found {}",
                expected.len(),
                schema.properties.len()
            )));
        }
        for (i, (prop, (name, data_type))) in schema.properties.iter().zip(expected).enumerate() {
            if prop.name != *name || prop.data_type != *data_type {
                return Err(PlyError::SchemaMismatch(format!(
                    "property {i} is {} {:?}, expected {name} {data_type:?}",
                    prop.name, prop.data_type
                )));
            }
        }
        Ok(())
    }

    /// Whether the records carry semantic and instance labels.
    pub fn is_labeled(&self) -> bool {
        matches!(
            self,
            RecordLayout::LabeledStatic | RecordLayout::LabeledDynamic
        )
    }

    /// Decode one packed record.
    pub fn decode(&self, buffer: &[u8]) -> Result<PointRecord, PlyError> {
        let config = bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding();
        let record: PointRecord = match self {
            RecordLayout::LabeledStatic => {
                bincode::decode_from_slice::<LabeledStatic, _>(buffer, config)?.0.into()
            }
            RecordLayout::LabeledDynamic => {
                bincode::decode_from_slice::<LabeledDynamic, _>(buffer, config)?.0.into()
            }
            RecordLayout::UnlabeledStatic => {
                bincode::decode_from_slice::<UnlabeledStatic, _>(buffer, config)?.0.into()
            }
            RecordLayout::UnlabeledDynamic => {
                bincode::decode_from_slice::<UnlabeledDynamic, _>(buffer, config)?.0.into()
            }
        };
        Ok(record)
    }
}

#[derive(bincode::Decode)]
struct LabeledStatic {
    xyz: [f32; 3],
    rgb: [u8; 3],
    semantic: i32,
    instance: i32,
    visible: u8,
    confidence: f32,
}

#[derive(bincode::Decode)]
struct LabeledDynamic {
    xyz: [f32; 3],
    rgb: [u8; 3],
    semantic: i32,
    instance: i32,
    visible: u8,
    timestamp: i32,
    confidence: f32,
}

#[derive(bincode::Decode)]
struct UnlabeledStatic {
    xyz: [f32; 3],
    rgb: [u8; 3],
    visible: u8,
}

#[derive(bincode::Decode)]
struct UnlabeledDynamic {
    xyz: [f32; 3],
    rgb: [u8; 3],
    timestamp: i32,
}

impl From<LabeledStatic> for PointRecord {
    fn from(r: LabeledStatic) -> Self {
        PointRecord {
            position: r.xyz,
            rgb: r.rgb,
            semantic_id: r.semantic,
            global_id: r.instance,
            timestamp: -1,
            visible: r.visible != 0,
            visible_raw: false,
            confidence: r.confidence,
        }
    }
}

impl From<LabeledDynamic> for PointRecord {
    fn from(r: LabeledDynamic) -> Self {
        PointRecord {
            position: r.xyz,
            rgb: r.rgb,
            semantic_id: r.semantic,
            global_id: r.instance,
            timestamp: r.timestamp,
            visible: r.visible != 0,
            visible_raw: false,
            confidence: r.confidence,
        }
    }
}

impl From<UnlabeledStatic> for PointRecord {
    fn from(r: UnlabeledStatic) -> Self {
        PointRecord {
            position: r.xyz,
            rgb: r.rgb,
            semantic_id: 0,
            global_id: 0,
            timestamp: -1,
            visible: false,
            visible_raw: r.visible != 0,
            confidence: 0.0,
        }
    }
}

impl From<UnlabeledDynamic> for PointRecord {
    fn from(r: UnlabeledDynamic) -> Self {
        PointRecord {
            position: r.xyz,
            rgb: r.rgb,
            semantic_id: 0,
            global_id: 0,
            timestamp: r.timestamp,
            visible: false,
            visible_raw: false,
            confidence: 0.0,
        }
    }
}

/// Decode the attribute records of a window from its binary body.
///
/// The number of records that fit in the body must equal the vertex count of
/// the header, otherwise the file is considered corrupted. The header must
/// list the properties of the layout in storage order.
pub fn read_point_records(
    path: impl AsRef<Path>,
    layout: RecordLayout,
) -> Result<Vec<PointRecord>, PlyError> {
    let (header, body) = read_ply_body(path)?;
    layout.check_schema(&header.schema)?;
    let size = layout.record_size();

    if body.len() % size != 0 || body.len() / size != header.vertex_count {
        return Err(PlyError::RecordCountMismatch {
            expected: header.vertex_count,
            found: body.len() / size,
        });
    }

    body.chunks_exact(size)
        .map(|chunk| layout.decode(chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn header(layout: &str, count: usize) -> String {
        format!("ply\nformat binary_little_endian 1.0\nelement vertex {count}\n{layout}end_header\n")
    }

    const LABELED_STATIC: &str = "property float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nproperty int semantic\nproperty int instance\nproperty uchar visible\nproperty float confidence\n";

    fn labeled_static(xyz: [f32; 3], semantic: i32, instance: i32, visible: u8) -> Vec<u8> {
        let mut data = Vec::new();
        for v in xyz {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[9, 8, 7]);
        data.extend_from_slice(&semantic.to_le_bytes());
        data.extend_from_slice(&instance.to_le_bytes());
        data.push(visible);
        data.extend_from_slice(&0.5f32.to_le_bytes());
        data
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(RecordLayout::new(true, false).record_size(), 28);
        assert_eq!(RecordLayout::new(true, true).record_size(), 32);
        assert_eq!(RecordLayout::new(false, false).record_size(), 16);
        assert_eq!(RecordLayout::new(false, true).record_size(), 19);
        assert!(RecordLayout::LabeledDynamic.is_labeled());
        assert!(!RecordLayout::UnlabeledStatic.is_labeled());
    }

    #[test]
    fn test_layout_from_header() -> Result<(), PlyError> {
        let text = header(LABELED_STATIC, 1);
        let mut reader = std::io::BufReader::new(text.as_bytes());
        let parsed = super::super::parser::parse_header(&mut reader)?;
        let layout = RecordLayout::from_schema(&parsed.schema);
        assert_eq!(layout, RecordLayout::LabeledStatic);
        assert_eq!(layout.record_size(), parsed.schema.record_size());
        Ok(())
    }

    #[test]
    fn test_read_point_records_reordered_properties() -> Result<(), Box<dyn std::error::Error>> {
        // same properties as the labeled static layout, instance before semantic
        let swapped = LABELED_STATIC.replace(
            "property int semantic\nproperty int instance\n",
            "property int instance\nproperty int semantic\n",
        );
        let mut file = NamedTempFile::new()?;
        file.write_all(header(&swapped, 1).as_bytes())?;
        file.write_all(&labeled_static([1.0, 2.0, 3.0], 26, 26001, 1))?;

        let result = read_point_records(file.path(), RecordLayout::LabeledStatic);
        assert!(matches!(result, Err(PlyError::SchemaMismatch(_))));
        Ok(())
    }

    #[test]
    fn test_check_schema_type() -> Result<(), PlyError> {
        let text = header(&LABELED_STATIC.replace("uchar visible", "int visible"), 1);
        let mut reader = std::io::BufReader::new(text.as_bytes());
        let parsed = super::super::parser::parse_header(&mut reader)?;
        assert!(RecordLayout::LabeledStatic.check_schema(&parsed.schema).is_err());

        let text = header(LABELED_STATIC, 1);
        let mut reader = std::io::BufReader::new(text.as_bytes());
        let parsed = super::super::parser::parse_header(&mut reader)?;
        RecordLayout::LabeledStatic.check_schema(&parsed.schema)?;
        Ok(())
    }

    #[test]
    fn test_decode_labeled_dynamic() -> Result<(), PlyError> {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[1, 2, 3]);
        data.extend_from_slice(&26i32.to_le_bytes());
        data.extend_from_slice(&26005i32.to_le_bytes());
        data.push(1);
        data.extend_from_slice(&412i32.to_le_bytes());
        data.extend_from_slice(&0.25f32.to_le_bytes());
        assert_eq!(data.len(), 32);

        let record = RecordLayout::LabeledDynamic.decode(&data)?;
        assert_eq!(record.position, [1.0, 2.0, 3.0]);
        assert_eq!(record.rgb, [1, 2, 3]);
        assert_eq!(record.semantic_id, 26);
        assert_eq!(record.global_id, 26005);
        assert_eq!(record.timestamp, 412);
        assert!(record.visible);
        assert_eq!(record.confidence, 0.25);
        Ok(())
    }

    #[test]
    fn test_decode_unlabeled_static() -> Result<(), PlyError> {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[4, 5, 6, 1]);

        let record = RecordLayout::UnlabeledStatic.decode(&data)?;
        assert_eq!(record.rgb, [4, 5, 6]);
        assert_eq!(record.semantic_id, 0);
        assert_eq!(record.timestamp, -1);
        assert!(record.visible_raw);
        assert!(!record.visible);
        Ok(())
    }

    #[test]
    fn test_read_point_records() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        file.write_all(header(LABELED_STATIC, 2).as_bytes())?;
        file.write_all(&labeled_static([1.0, 2.0, 3.0], 26, 26001, 1))?;
        file.write_all(&labeled_static([4.0, 5.0, 6.0], 11, 11003, 0))?;

        let records = read_point_records(file.path(), RecordLayout::LabeledStatic)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].global_id, 26001);
        assert!(records[0].visible);
        assert_eq!(records[1].semantic_id, 11);
        assert!(!records[1].visible);
        assert_eq!(records[1].timestamp, -1);
        Ok(())
    }

    #[test]
    fn test_read_point_records_count_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        file.write_all(header(LABELED_STATIC, 3).as_bytes())?;
        file.write_all(&labeled_static([1.0, 2.0, 3.0], 26, 26001, 1))?;
        file.write_all(&labeled_static([4.0, 5.0, 6.0], 11, 11003, 0))?;

        match read_point_records(file.path(), RecordLayout::LabeledStatic) {
            Err(PlyError::RecordCountMismatch { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected a count mismatch, got {other:?}"),
        }
        Ok(())
    }
}
