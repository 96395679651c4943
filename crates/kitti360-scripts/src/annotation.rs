use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kitti360_3d::{
    linalg::transform_points3d,
    mesh::BOX_LINES,
    transforms::{mat3_to_rows, split_homogeneous},
};
use quick_xml::{events::Event, Reader};

use crate::{ids::local_to_global, labels::kitti_id2label};

/// Subsets of the dataset that may hold the annotations of a sequence.
const SPLITS: [&str; 2] = ["train", "test"];

/// Error types for the annotation module.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// Failed to read the annotation file
    #[error("Failed to read annotation file")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("Failed to parse annotation XML")]
    Xml(#[from] quick_xml::Error),

    /// A field is missing or has an invalid value
    #[error("Invalid annotation: {0}")]
    Parse(String),

    /// The semantic id of the annotation has no label
    #[error("Unknown kitti id {0}")]
    UnknownKittiId(i32),

    /// No annotation file exists for the sequence
    #[error("{0} does not exist")]
    NotFound(PathBuf),
}

/// A 3d bounding box annotation in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedObject {
    /// Semantic id of the object class.
    pub semantic_id: i32,
    /// Instance id, unique within the class.
    pub instance_id: i32,
    /// Class name.
    pub name: String,
    /// Box corners in world coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Triangles over `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Wireframe edges over `vertices`.
    pub lines: Vec<[u32; 2]>,
    /// Row-major box-to-world transform.
    pub transform: [[f64; 4]; 4],
    /// First frame where the object is annotated.
    pub start_frame: i32,
    /// Last frame where the object is annotated.
    pub end_frame: i32,
    /// Frame of a dynamic object, -1 for static ones.
    pub timestamp: i32,
}

impl AnnotatedObject {
    /// The global id of the object.
    pub fn global_id(&self) -> i32 {
        local_to_global(self.semantic_id, self.instance_id)
    }
}

/// An `opencv-matrix` node: `rows`, `cols` and row-major `data`.
#[derive(Debug, Default)]
struct RawMatrix {
    rows: Option<usize>,
    cols: Option<usize>,
    data: Vec<f64>,
}

impl RawMatrix {
    fn shape(&self, name: &str) -> Result<(usize, usize), AnnotationError> {
        match (self.rows, self.cols) {
            (Some(rows), Some(cols)) if rows * cols == self.data.len() => Ok((rows, cols)),
            _ => Err(AnnotationError::Parse(format!(
                "matrix {name} has {} values for {:?}x{:?}",
                self.data.len(),
                self.rows,
                self.cols
            ))),
        }
    }
}

/// The children of one object element, before validation.
#[derive(Debug, Default)]
struct RawObject {
    fields: BTreeMap<String, String>,
    matrices: BTreeMap<String, RawMatrix>,
}

fn parse_number<T: std::str::FromStr>(text: &str, what: &str) -> Result<T, AnnotationError> {
    text.trim()
        .parse::<T>()
        .map_err(|_| AnnotationError::Parse(format!("{what}: {text}")))
}

/// Faces are stored as floats; only non-negative integers are valid indices.
fn face_index(value: f64) -> Result<u32, AnnotationError> {
    if value.fract() != 0.0 || !(0.0..=u32::MAX as f64).contains(&value) {
        return Err(AnnotationError::Parse(format!("invalid face index: {value}")));
    }
    Ok(value as u32)
}

impl RawObject {
    fn field(&self, name: &str) -> Result<i32, AnnotationError> {
        let text = self
            .fields
            .get(name)
            .ok_or_else(|| AnnotationError::Parse(format!("missing {name}")))?;
        parse_number(text, name)
    }

    fn matrix(&self, name: &str) -> Result<&RawMatrix, AnnotationError> {
        self.matrices
            .get(name)
            .ok_or_else(|| AnnotationError::Parse(format!("missing {name}")))
    }

    fn build(&self) -> Result<AnnotatedObject, AnnotationError> {
        let kitti_id = self.field("semanticId")?;
        let label = kitti_id2label(kitti_id).ok_or(AnnotationError::UnknownKittiId(kitti_id))?;

        let transform = {
            let matrix = self.matrix("transform")?;
            if matrix.shape("transform")? != (4, 4) {
                return Err(AnnotationError::Parse("transform must be 4x4".into()));
            }
            let mut transform = [[0.0; 4]; 4];
            for (i, row) in transform.iter_mut().enumerate() {
                row.copy_from_slice(&matrix.data[i * 4..i * 4 + 4]);
            }
            transform
        };

        let vertices = {
            let matrix = self.matrix("vertices")?;
            if matrix.shape("vertices")?.1 != 3 {
                return Err(AnnotationError::Parse("vertices must have 3 columns".into()));
            }
            let local = matrix
                .data
                .chunks_exact(3)
                .map(|v| [v[0], v[1], v[2]])
                .collect::<Vec<_>>();
            let (rotation, translation) = split_homogeneous(&transform);
            let mut world = vec![[0.0; 3]; local.len()];
            transform_points3d(
                &local,
                &mat3_to_rows(&rotation),
                &translation.to_array(),
                &mut world,
            )
            .map_err(|e| AnnotationError::Parse(e.to_string()))?;
            world
        };

        let faces = {
            let matrix = self.matrix("faces")?;
            if matrix.shape("faces")?.1 != 3 {
                return Err(AnnotationError::Parse("faces must have 3 columns".into()));
            }
            matrix
                .data
                .chunks_exact(3)
                .map(|f| Ok([face_index(f[0])?, face_index(f[1])?, face_index(f[2])?]))
                .collect::<Result<Vec<_>, AnnotationError>>()?
        };

        Ok(AnnotatedObject {
            semantic_id: label.id,
            instance_id: self.field("instanceId")?,
            name: label.name.to_string(),
            vertices,
            faces,
            lines: BOX_LINES.to_vec(),
            transform,
            start_frame: self.field("start_frame")?,
            end_frame: self.field("end_frame")?,
            timestamp: self.field("timestamp")?,
        })
    }
}

/// The 3d bounding boxes of one sequence, keyed by global id then timestamp.
#[derive(Debug, Clone, Default)]
pub struct Annotation3D {
    /// Objects by global id, then by timestamp.
    pub objects: BTreeMap<i32, BTreeMap<i32, AnnotatedObject>>,
}

impl Annotation3D {
    /// Locate and read the annotations of a sequence.
    ///
    /// # Arguments
    ///
    /// * `bbox_dir` - The `data_3d_bboxes` directory of the dataset.
    /// * `sequence` - The sequence name, e.g. `2013_05_28_drive_0000_sync`.
    pub fn from_sequence(bbox_dir: impl AsRef<Path>, sequence: &str) -> Result<Self, AnnotationError> {
        let bbox_dir = bbox_dir.as_ref();
        let path = SPLITS
            .iter()
            .map(|split| bbox_dir.join(split).join(format!("{sequence}.xml")))
            .find(|p| p.is_file())
            .ok_or_else(|| AnnotationError::NotFound(bbox_dir.join("*").join(format!("{sequence}.xml"))))?;
        Self::from_file(path)
    }

    /// Read an annotation file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnnotationError> {
        log::info!("Loading {}", path.as_ref().display());
        let text = std::fs::read_to_string(path)?;
        Self::from_xml(&text)
    }

    /// Parse the XML content of an annotation file.
    ///
    /// Every child of the root element is an object. Objects without a
    /// `transform` are ignored.
    pub fn from_xml(text: &str) -> Result<Self, AnnotationError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut annotation = Self::default();
        // element names from the root down to the current node
        let mut path: Vec<String> = Vec::new();
        let mut current = RawObject::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    if path.len() == 2 {
                        current = RawObject::default();
                    }
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| AnnotationError::Parse(e.to_string()))?;
                    match path.as_slice() {
                        [_, _, field] => {
                            current.fields.insert(field.clone(), text.into_owned());
                        }
                        [_, _, matrix, entry] => {
                            let raw = current.matrices.entry(matrix.clone()).or_default();
                            match entry.as_str() {
                                "rows" => raw.rows = Some(parse_number(&text, "rows")?),
                                "cols" => raw.cols = Some(parse_number(&text, "cols")?),
                                "data" => {
                                    for value in text.split_whitespace() {
                                        raw.data.push(parse_number(value, "data")?);
                                    }
                                }
                                _ => {}
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(_) => {
                    if path.len() == 2 {
                        let raw = std::mem::take(&mut current);
                        if raw.matrices.contains_key("transform") {
                            let obj = raw.build()?;
                            annotation
                                .objects
                                .entry(obj.global_id())
                                .or_default()
                                .insert(obj.timestamp, obj);
                        }
                    }
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!("Loaded {} annotated objects", annotation.objects.len());

        Ok(annotation)
    }

    /// Number of distinct global ids.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object is annotated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get an object by global id and timestamp.
    pub fn get(&self, global_id: i32, timestamp: i32) -> Option<&AnnotatedObject> {
        self.objects.get(&global_id)?.get(&timestamp)
    }

    /// Iterate over the objects annotated exactly once.
    pub fn static_objects(&self) -> impl Iterator<Item = (i32, &AnnotatedObject)> {
        self.objects
            .iter()
            .filter(|(_, by_time)| by_time.len() == 1)
            .flat_map(|(global_id, by_time)| by_time.values().map(move |obj| (*global_id, obj)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const UNIT_VERTICES: &str = "0.5 0.5 0.5 0.5 0.5 -0.5 0.5 -0.5 0.5 0.5 -0.5 -0.5\n -0.5 0.5 -0.5 -0.5 0.5 0.5 -0.5 -0.5 -0.5 -0.5 -0.5 0.5";
    const UNIT_FACES: &str = "0 2 1 1 2 3 5 4 7 4 6 7 0 1 5 1 4 5 2 7 3 3 7 6 0 5 2 2 5 7 1 3 4 3 6 4";

    fn object(tag: &str, kitti_id: i32, instance_id: i32, timestamp: i32, transform: Option<&str>) -> String {
        let transform = transform.map_or(String::new(), |data| {
            format!("<transform type_id=\"opencv-matrix\"><rows>4</rows><cols>4</cols><dt>f</dt><data>{data}</data></transform>")
        });
        format!(
            "<{tag}>{transform}<semanticId>{kitti_id}</semanticId><instanceId>{instance_id}</instanceId>\
             <vertices type_id=\"opencv-matrix\"><rows>8</rows><cols>3</cols><dt>f</dt><data>{UNIT_VERTICES}</data></vertices>\
             <faces type_id=\"opencv-matrix\"><rows>12</rows><cols>3</cols><dt>i</dt><data>{UNIT_FACES}</data></faces>\
             <start_frame>10</start_frame><end_frame>250</end_frame><timestamp>{timestamp}</timestamp></{tag}>"
        )
    }

    const SCALED: &str = "4 0 0 10\n0 2 0 20\n0 0 1.5 30\n0 0 0 1";
    const IDENTITY: &str = "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1";

    fn document(objects: &[String]) -> String {
        format!("<?xml version=\"1.0\"?>\n<opencv_storage>\n{}\n</opencv_storage>", objects.join("\n"))
    }

    #[test]
    fn test_static_object() -> Result<(), AnnotationError> {
        let xml = document(&[object("object1", 13, 3, -1, Some(SCALED))]);
        let annotation = Annotation3D::from_xml(&xml)?;
        assert_eq!(annotation.len(), 1);

        let car = annotation.get(26003, -1).unwrap();
        assert_eq!(car.name, "car");
        assert_eq!(car.semantic_id, 26);
        assert_eq!(car.instance_id, 3);
        assert_eq!((car.start_frame, car.end_frame), (10, 250));
        assert_eq!(car.faces.len(), 12);
        assert_eq!(car.lines.len(), 12);
        assert_eq!(car.transform[1][3], 20.0);

        // vertices are moved to the world frame
        assert_relative_eq!(car.vertices[0][0], 12.0);
        assert_relative_eq!(car.vertices[0][1], 21.0);
        assert_relative_eq!(car.vertices[0][2], 30.75);
        assert_relative_eq!(car.vertices[6][0], 8.0);
        Ok(())
    }

    #[test]
    fn test_dynamic_object_and_missing_transform() -> Result<(), AnnotationError> {
        let xml = document(&[
            object("object1", 13, 1, 100, Some(IDENTITY)),
            object("object2", 13, 1, 101, Some(IDENTITY)),
            object("object3", 21, 2, -1, None),
            object("object4", 11, 7, -1, Some(IDENTITY)),
        ]);
        let annotation = Annotation3D::from_xml(&xml)?;

        assert_eq!(annotation.len(), 2);
        assert_eq!(annotation.objects[&26001].len(), 2);
        assert!(annotation.get(26001, 101).is_some());

        let statics = annotation.static_objects().collect::<Vec<_>>();
        assert_eq!(statics.len(), 1);
        assert_eq!(statics[0].0, 11007);
        assert_eq!(statics[0].1.name, "building");
        Ok(())
    }

    #[test]
    fn test_invalid_face_index() {
        for bad in ["-1 2 1", "0.5 2 1"] {
            let xml = document(&[object("object1", 13, 3, -1, Some(SCALED))])
                .replacen("0 2 1", bad, 1);
            assert!(matches!(
                Annotation3D::from_xml(&xml),
                Err(AnnotationError::Parse(_))
            ));
        }
        assert_eq!(face_index(7.0).ok(), Some(7));
        assert!(face_index(f64::NAN).is_err());
    }

    #[test]
    fn test_unknown_kitti_id() {
        let xml = document(&[object("object1", 99, 1, -1, Some(IDENTITY))]);
        assert!(matches!(
            Annotation3D::from_xml(&xml),
            Err(AnnotationError::UnknownKittiId(99))
        ));
    }

    #[test]
    fn test_from_sequence() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let sequence = "2013_05_28_drive_0000_sync";
        assert!(matches!(
            Annotation3D::from_sequence(dir.path(), sequence),
            Err(AnnotationError::NotFound(_))
        ));

        std::fs::create_dir_all(dir.path().join("train"))?;
        std::fs::write(
            dir.path().join("train").join(format!("{sequence}.xml")),
            document(&[object("object1", 13, 4, -1, Some(IDENTITY))]),
        )?;
        let annotation = Annotation3D::from_sequence(dir.path(), sequence)?;
        assert!(annotation.get(26004, -1).is_some());
        Ok(())
    }
}
