use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use kitti360_3d::{
    canonical::{canonicalize_points, BoxFrame, CanonicalError},
    io::{
        npy::{write_npy_points, NpyError},
        ply::{read_ply_binary, read_ply_header, read_point_records, PlyError, PointRecord, RecordLayout},
    },
    mesh::{LineSet, TriangleMesh},
    pointcloud::PointCloud,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    annotation::{AnnotatedObject, Annotation3D, AnnotationError},
    color::{ColorMode, ColorTable},
    ids::instance_of,
    labels::{id2label, name2label},
    trajectory::{read_cam_to_world, CameraTrajectory, TrajectoryError},
};

/// Environment variable holding the dataset root.
pub const DATASET_ENV: &str = "KITTI360_DATASET";

/// Wireframe radius of pole-like classes.
pub const POLE_RADIUS: f64 = 0.05;

/// Wireframe radius of every other class.
pub const BOX_RADIUS: f64 = 0.08;

/// Error types for the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Failed to access the dataset
    #[error("Failed to access the dataset")]
    Io(#[from] std::io::Error),

    /// Failed to read a point cloud window
    #[error(transparent)]
    Ply(#[from] PlyError),

    /// Failed to write a canonical point cloud
    #[error(transparent)]
    Npy(#[from] NpyError),

    /// Failed to read the bounding boxes
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// Failed to read the camera poses
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    /// No bounding box of the target category was found
    #[error("No bounding boxes found! Please set KITTI360_DATASET in your environment path")]
    NoBoundingBoxes,

    /// The visualization mode is not one of rgb, semantic, instance, bbox
    #[error("Color type can only be 'rgb', 'bbox', 'semantic', 'instance', got '{0}'")]
    UnsupportedMode(String),

    /// The target category has no label
    #[error("Unknown category {0}")]
    UnknownCategory(String),
}

/// What the viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualizationMode {
    /// Recorded point colors.
    Rgb,
    /// Semantic class colors.
    #[default]
    Semantic,
    /// Instance colors.
    Instance,
    /// Bounding box meshes only.
    BBox,
}

impl FromStr for VisualizationMode {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "semantic" => Ok(Self::Semantic),
            "instance" => Ok(Self::Instance),
            "bbox" => Ok(Self::BBox),
            _ => Err(ViewerError::UnsupportedMode(s.to_string())),
        }
    }
}

/// How newly seen instances are detected across consecutive windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoveltyPolicy {
    /// Compare against the ids of the previous non-empty window only.
    ///
    /// An instance that skips a window is reported again when it reappears.
    #[default]
    PreviousWindow,
    /// Compare against every id seen so far.
    FullHistory,
}

/// Tracks which instance ids were already reported.
#[derive(Debug, Clone, Default)]
pub struct InstanceNovelty {
    policy: NoveltyPolicy,
    baseline: BTreeSet<i32>,
}

impl InstanceNovelty {
    /// Create a tracker with the given policy.
    pub fn new(policy: NoveltyPolicy) -> Self {
        Self {
            policy,
            baseline: BTreeSet::new(),
        }
    }

    /// Return the ids of `window_ids` not in the baseline, sorted, and update it.
    pub fn update(&mut self, window_ids: &BTreeSet<i32>) -> Vec<i32> {
        let new_ids = window_ids.difference(&self.baseline).copied().collect();
        match self.policy {
            NoveltyPolicy::PreviousWindow => self.baseline = window_ids.clone(),
            NoveltyPolicy::FullHistory => self.baseline.extend(window_ids),
        }
        new_ids
    }
}

/// Which points of a window are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFilter {
    /// Points of the category whose visibility flag is set.
    VisibleOnly {
        /// Semantic id of the category.
        category: i32,
    },
    /// Every point except those of the category.
    ExcludeCategory {
        /// Semantic id of the category.
        category: i32,
    },
    /// Only the points of the category.
    OnlyCategory {
        /// Semantic id of the category.
        category: i32,
    },
}

impl WindowFilter {
    /// Compute the keep mask of a window, one entry per record.
    pub fn mask(&self, records: &[PointRecord], layout: RecordLayout) -> Vec<bool> {
        records
            .iter()
            .map(|r| match *self {
                WindowFilter::VisibleOnly { category } => {
                    let visible = if layout.is_labeled() {
                        r.visible
                    } else {
                        r.visible_raw
                    };
                    r.semantic_id == category && visible
                }
                WindowFilter::ExcludeCategory { category } => r.semantic_id != category,
                WindowFilter::OnlyCategory { category } => r.semantic_id == category,
            })
            .collect()
    }
}

/// Settings of a viewer run.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Root directory of the dataset.
    pub dataset_root: PathBuf,
    /// Sequence index.
    pub sequence: usize,
    /// What to show.
    pub mode: VisualizationMode,
    /// Maximum number of boxes rendered per window.
    pub max_bbox: usize,
    /// Read the static windows, otherwise the dynamic ones.
    pub show_static: bool,
    /// Keep only visible points of the category.
    pub visible_only: bool,
    /// Name of the category extracted into canonical point clouds.
    pub category: String,
    /// How new instances are detected.
    pub novelty: NoveltyPolicy,
    /// Keep one point every `downsample_every` after filtering.
    pub downsample_every: usize,
    /// Seed of the box subsampling.
    pub seed: u64,
    /// Where canonical point clouds are written.
    pub output_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dataset_root: dataset_root_from_env(),
            sequence: 0,
            mode: VisualizationMode::default(),
            max_bbox: 100,
            show_static: true,
            visible_only: false,
            category: "car".to_string(),
            novelty: NoveltyPolicy::default(),
            downsample_every: 1,
            seed: 0,
            output_dir: None,
        }
    }
}

/// The name of a sequence, e.g. `2013_05_28_drive_0000_sync`.
pub fn sequence_name(sequence: usize) -> String {
    format!("2013_05_28_drive_{sequence:04}_sync")
}

/// The dataset root from [`DATASET_ENV`], or two levels above the executable.
pub fn dataset_root_from_env() -> PathBuf {
    if let Some(root) = std::env::var_os(DATASET_ENV) {
        return PathBuf::from(root);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join("..")
        .join("..")
}

impl ViewerConfig {
    /// The sequence name.
    pub fn sequence_name(&self) -> String {
        sequence_name(self.sequence)
    }

    /// Directory of the point cloud windows.
    pub fn windows_dir(&self) -> PathBuf {
        let folder = if self.show_static { "static" } else { "dynamic" };
        self.dataset_root
            .join("data_3d_semantics")
            .join(self.sequence_name())
            .join(folder)
    }

    /// Directory of the bounding box annotations.
    pub fn bboxes_dir(&self) -> PathBuf {
        self.dataset_root.join("data_3d_bboxes")
    }

    /// The camera pose file of the sequence.
    pub fn poses_path(&self) -> PathBuf {
        self.dataset_root
            .join("data_poses")
            .join(self.sequence_name())
            .join("cam0_to_world.txt")
    }

    /// Where canonical point clouds are written.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.dataset_root
                .join("data_3d_car_pointcloud")
                .join(&self.category)
        })
    }

    /// Semantic id of the target category.
    pub fn category_id(&self) -> Result<i32, ViewerError> {
        name2label(&self.category)
            .map(|l| l.id)
            .ok_or_else(|| ViewerError::UnknownCategory(self.category.clone()))
    }
}

/// A filtered point cloud window.
#[derive(Debug, Clone)]
pub struct Window {
    /// File stem of the window, e.g. `0000000002_0000000385`.
    pub name: String,
    /// Kept points.
    pub pointcloud: PointCloud,
    /// Attribute records of the kept points, in the same order.
    pub records: Vec<PointRecord>,
    /// Binary layout of the records.
    pub layout: RecordLayout,
}

impl Window {
    /// Number of kept points.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no point was kept.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The distinct local instance ids of the window.
    pub fn instance_ids(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| instance_of(r.global_id)).collect()
    }

    /// Positions of the points of one instance, in window order.
    pub fn instance_points(&self, instance_id: i32) -> Vec<[f64; 3]> {
        self.records
            .iter()
            .filter(|r| instance_of(r.global_id) == instance_id)
            .map(|r| r.position.map(|v| v as f64))
            .collect()
    }
}

/// The boxes of one `[start_frame, end_frame]` window.
#[derive(Debug, Clone)]
pub struct BoxGroup {
    /// Frame range of the group.
    pub window: [i32; 2],
    /// Number of boxes before subsampling.
    pub total: usize,
    /// The boxes to render.
    pub meshes: Vec<TriangleMesh>,
}

/// A canonical point cloud written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalInstance {
    /// Local instance id.
    pub instance_id: i32,
    /// Window where the instance first appeared.
    pub window: String,
    /// Number of points.
    pub num_points: usize,
    /// Output file.
    pub path: PathBuf,
}

/// Outcome of the canonical extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    /// Files written, in processing order.
    pub written: Vec<CanonicalInstance>,
    /// Instance ids without a bounding box.
    pub skipped: Vec<i32>,
    /// Instances whose box could not be inverted, with the reason.
    pub failed: Vec<(i32, CanonicalError)>,
    /// Names of windows without points of the category.
    pub empty_windows: Vec<String>,
}

/// Keep at most `max` items, sampled uniformly without replacement.
pub fn subsample<T: Clone>(items: &[T], max: usize, rng: &mut StdRng) -> Vec<T> {
    if items.len() <= max {
        return items.to_vec();
    }
    rand::seq::index::sample(rng, items.len(), max)
        .iter()
        .map(|i| items[i].clone())
        .collect()
}

/// The state of one viewer run.
///
/// Window geometry is cached by name for the lifetime of the viewer. Boxes and
/// accumulated records are filled by the load operations.
pub struct Viewer3D {
    config: ViewerConfig,
    annotation: Annotation3D,
    colors: ColorTable,
    point_clouds: HashMap<String, PointCloud>,
    bbox_index: HashMap<i32, usize>,
    /// Records of every loaded window after filtering, by window name.
    ///
    /// Loading a window again replaces its entry.
    pub accumulated: BTreeMap<String, Vec<PointRecord>>,
    /// Meshes of the static boxes of the target category.
    pub bboxes: Vec<TriangleMesh>,
    /// `[start_frame, end_frame]` of each mesh in `bboxes`.
    pub bboxes_window: Vec<[i32; 2]>,
    /// Box-to-world transform of each mesh in `bboxes`.
    pub bboxes_transform: Vec<[[f64; 4]; 4]>,
    /// Wireframes of every static box.
    pub line_sets: Vec<LineSet>,
}

impl Viewer3D {
    /// Create a viewer reading the annotations of the configured sequence.
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let annotation = Annotation3D::from_sequence(config.bboxes_dir(), &config.sequence_name())?;
        Ok(Self::with_annotation(config, annotation))
    }

    /// Create a viewer over already loaded annotations.
    pub fn with_annotation(config: ViewerConfig, annotation: Annotation3D) -> Self {
        Self {
            config,
            annotation,
            colors: ColorTable::default(),
            point_clouds: HashMap::new(),
            bbox_index: HashMap::new(),
            accumulated: BTreeMap::new(),
            bboxes: Vec::new(),
            bboxes_window: Vec::new(),
            bboxes_transform: Vec::new(),
            line_sets: Vec::new(),
        }
    }

    /// The run settings.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The loaded annotations.
    pub fn annotation(&self) -> &Annotation3D {
        &self.annotation
    }

    /// The sorted window files of the sequence.
    ///
    /// A missing directory or an empty one yields no windows and a warning.
    pub fn list_windows(&self) -> Result<Vec<PathBuf>, ViewerError> {
        let dir = self.config.windows_dir();
        if !dir.is_dir() {
            log::warn!("{} does not exist!", dir.display());
            return Ok(Vec::new());
        }

        let mut windows = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ply"))
            .collect::<Vec<_>>();
        windows.sort();

        if windows.is_empty() {
            log::warn!("{} has no point cloud windows", dir.display());
        }
        Ok(windows)
    }

    /// Load a window and keep the points selected by `filter`.
    ///
    /// The same mask is applied to the geometry and to the attribute records,
    /// and the kept records are stored in [`Viewer3D::accumulated`] under the
    /// window name.
    pub fn load_window(
        &mut self,
        path: impl AsRef<Path>,
        filter: WindowFilter,
    ) -> Result<Window, ViewerError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!("Loading {}", path.display());

        let pointcloud = match self.point_clouds.get(&name) {
            Some(pointcloud) => pointcloud.clone(),
            None => {
                let pointcloud = read_ply_binary(path)?;
                self.point_clouds.insert(name.clone(), pointcloud.clone());
                pointcloud
            }
        };

        let layout = RecordLayout::from_schema(&read_ply_header(path)?.schema);
        let records = read_point_records(path, layout)?;
        if records.len() != pointcloud.len() {
            return Err(PlyError::RecordCountMismatch {
                expected: pointcloud.len(),
                found: records.len(),
            }
            .into());
        }

        let mask = filter.mask(&records, layout);
        let step = self.config.downsample_every.max(1);
        let pointcloud = pointcloud.select_by_mask(&mask).uniform_downsample(step);
        let records = records
            .into_iter()
            .zip(&mask)
            .filter_map(|(r, &m)| m.then_some(r))
            .step_by(step)
            .collect::<Vec<_>>();

        log::debug!("{name}: kept {} points", records.len());
        self.accumulated.insert(name.clone(), records.clone());

        Ok(Window {
            name,
            pointcloud,
            records,
            layout,
        })
    }

    /// Build the meshes of the static boxes of the target category.
    ///
    /// Returns the box transforms and instance ids in annotation order. The
    /// meshes and their frame ranges are stored in [`Viewer3D::bboxes`] and
    /// [`Viewer3D::bboxes_window`], replacing any previous content.
    pub fn load_bounding_boxes(&mut self) -> (Vec<[[f64; 4]; 4]>, Vec<i32>) {
        self.bboxes.clear();
        self.bboxes_window.clear();
        self.bboxes_transform.clear();
        self.bbox_index.clear();

        let mut instance_ids = Vec::new();
        for (global_id, obj) in self.annotation.static_objects() {
            if obj.name != self.config.category {
                continue;
            }
            let mut mesh = TriangleMesh::new(obj.vertices.clone(), obj.faces.clone());
            mesh.paint_uniform_color(self.colors.color(global_id, ColorMode::Semantic));
            mesh.compute_vertex_normals();

            self.bbox_index
                .entry(obj.instance_id)
                .or_insert(self.bboxes.len());
            self.bboxes.push(mesh);
            self.bboxes_window.push([obj.start_frame, obj.end_frame]);
            self.bboxes_transform.push(obj.transform);
            instance_ids.push(obj.instance_id);
        }

        log::info!("Loaded {} {} boxes", self.bboxes.len(), self.config.category);

        (self.bboxes_transform.clone(), instance_ids)
    }

    /// Build black wireframes for every static box, thinner for poles.
    pub fn load_bounding_box_wireframes(&mut self) -> &[LineSet] {
        self.line_sets = self
            .annotation
            .static_objects()
            .map(|(_, obj)| wireframe(obj))
            .collect();
        &self.line_sets
    }

    /// Index into [`Viewer3D::bboxes`] of the box of an instance.
    pub fn box_for_instance(&self, instance_id: i32) -> Option<usize> {
        self.bbox_index.get(&instance_id).copied()
    }

    fn require_boxes(&mut self) -> Result<(), ViewerError> {
        if self.bboxes.is_empty() {
            self.load_bounding_boxes();
        }
        if self.bboxes.is_empty() {
            return Err(ViewerError::NoBoundingBoxes);
        }
        Ok(())
    }

    /// Group the boxes by frame range, capping each group at `max_bbox`.
    ///
    /// Groups are sorted by `[start, end]`. A box belongs to every group with
    /// its start frame. Oversized groups are sampled without replacement with
    /// an RNG seeded from the configuration.
    pub fn bbox_groups(&mut self) -> Result<Vec<BoxGroup>, ViewerError> {
        self.require_boxes()?;

        let windows = self.bboxes_window.iter().copied().collect::<BTreeSet<_>>();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let groups = windows
            .into_iter()
            .map(|window| {
                let members = self
                    .bboxes
                    .iter()
                    .zip(&self.bboxes_window)
                    .filter(|(_, w)| w[0] == window[0])
                    .map(|(mesh, _)| mesh.clone())
                    .collect::<Vec<_>>();
                let total = members.len();
                if total > self.config.max_bbox {
                    log::info!(
                        "Randomly sample {}/{} bboxes for rendering efficiency",
                        self.config.max_bbox,
                        total
                    );
                }
                BoxGroup {
                    window,
                    total,
                    meshes: subsample(&members, self.config.max_bbox, &mut rng),
                }
            })
            .collect();

        Ok(groups)
    }

    /// Write the canonical point cloud of every instance of the category.
    ///
    /// Windows are visited in sorted order. Each instance is extracted from
    /// the window where the novelty policy first reports it. Instances without
    /// a box are skipped with a warning. Instances with a degenerate or
    /// singular box are logged and listed in [`ExtractionSummary::failed`].
    pub fn extract_canonical_instances(&mut self) -> Result<ExtractionSummary, ViewerError> {
        self.require_boxes()?;

        let category = self.config.category_id()?;
        let filter = if self.config.visible_only {
            WindowFilter::VisibleOnly { category }
        } else {
            WindowFilter::OnlyCategory { category }
        };

        let output_dir = self.config.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        let mut novelty = InstanceNovelty::new(self.config.novelty);
        let mut summary = ExtractionSummary::default();

        for path in self.list_windows()? {
            let window = self.load_window(&path, filter)?;
            if window.is_empty() {
                log::warn!(
                    "{} has no points of category {}",
                    window.name,
                    self.config.category
                );
                summary.empty_windows.push(window.name);
                continue;
            }

            for instance_id in novelty.update(&window.instance_ids()) {
                let Some(idx) = self.box_for_instance(instance_id) else {
                    log::warn!("No bounding box for instance {instance_id}, skipping");
                    summary.skipped.push(instance_id);
                    continue;
                };

                let points = window.instance_points(instance_id);
                let canonical = match BoxFrame::from_transform(
                    &self.bboxes_transform[idx],
                    &self.bboxes[idx].vertices,
                )
                .and_then(|frame| canonicalize_points(&points, &frame))
                {
                    Ok(canonical) => canonical,
                    Err(err) => {
                        log::error!("Cannot canonicalize instance {instance_id}: {err}");
                        summary.failed.push((instance_id, err));
                        continue;
                    }
                };

                let out_path = output_dir.join(format!("{instance_id}_canonical.npy"));
                write_npy_points(&out_path, &canonical)?;
                log::debug!(
                    "Instance {instance_id}: {} points written to {}",
                    canonical.len(),
                    out_path.display()
                );

                summary.written.push(CanonicalInstance {
                    instance_id,
                    window: window.name.clone(),
                    num_points: canonical.len(),
                    path: out_path,
                });
            }
        }

        Ok(summary)
    }

    /// Load a window without the target category, for rendering the scene.
    pub fn load_scene_window(&mut self, path: impl AsRef<Path>) -> Result<Window, ViewerError> {
        let category = self.config.category_id()?;
        self.load_window(path, WindowFilter::ExcludeCategory { category })
    }

    /// Colors of the points of a window for the configured mode.
    ///
    /// Dynamic windows are colored by timestamp in instance mode.
    pub fn window_colors(&self, window: &Window) -> Vec<[f64; 3]> {
        let global_ids = || window.records.iter().map(|r| r.global_id).collect::<Vec<_>>();
        match self.config.mode {
            VisualizationMode::Semantic => self.colors.assign_colors(&global_ids(), ColorMode::Semantic),
            VisualizationMode::Instance if !self.config.show_static => {
                let timestamps = window.records.iter().map(|r| r.timestamp).collect::<Vec<_>>();
                self.colors.timestamp_colors(&timestamps)
            }
            VisualizationMode::Instance => self.colors.assign_colors(&global_ids(), ColorMode::Instance),
            VisualizationMode::Rgb | VisualizationMode::BBox => window
                .records
                .iter()
                .map(|r| r.rgb.map(|c| c as f64 / 255.0))
                .collect(),
        }
    }

    /// Read the camera path of the sequence.
    pub fn load_camera_trajectory(&self) -> Result<CameraTrajectory, ViewerError> {
        let poses = read_cam_to_world(self.config.poses_path())?;
        let trajectory = CameraTrajectory::from_poses(&poses);
        log::info!(
            "Camera trajectory: {} frames, {:.1} m",
            trajectory.num_frames,
            trajectory.distance
        );
        Ok(trajectory)
    }
}

fn wireframe(obj: &AnnotatedObject) -> LineSet {
    let is_pole = id2label(obj.semantic_id).is_some_and(|l| l.name.contains("pole"));
    let radius = if is_pole { POLE_RADIUS } else { BOX_RADIUS };
    LineSet::new(obj.vertices.clone(), obj.lines.clone(), [0.0; 3], radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(semantic_id: i32, global_id: i32, visible: bool) -> PointRecord {
        PointRecord {
            position: [0.0; 3],
            rgb: [0; 3],
            semantic_id,
            global_id,
            timestamp: -1,
            visible,
            visible_raw: !visible,
            confidence: 1.0,
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("bbox".parse::<VisualizationMode>().ok(), Some(VisualizationMode::BBox));
        assert_eq!("RGB".parse::<VisualizationMode>().ok(), Some(VisualizationMode::Rgb));
        assert!(matches!(
            "depth".parse::<VisualizationMode>(),
            Err(ViewerError::UnsupportedMode(_))
        ));
    }

    #[test]
    fn test_filter_masks() {
        let records = [record(26, 26001, true), record(26, 26002, false), record(7, 7000, true)];

        let only = WindowFilter::OnlyCategory { category: 26 };
        assert_eq!(only.mask(&records, RecordLayout::LabeledStatic), [true, true, false]);

        let exclude = WindowFilter::ExcludeCategory { category: 26 };
        assert_eq!(exclude.mask(&records, RecordLayout::LabeledStatic), [false, false, true]);

        let visible = WindowFilter::VisibleOnly { category: 26 };
        assert_eq!(visible.mask(&records, RecordLayout::LabeledStatic), [true, false, false]);
        // unlabeled layouts read the other flag
        assert_eq!(visible.mask(&records, RecordLayout::UnlabeledStatic), [false, true, false]);
    }

    #[test]
    fn test_novelty_previous_window() {
        let mut novelty = InstanceNovelty::new(NoveltyPolicy::PreviousWindow);
        assert_eq!(novelty.update(&BTreeSet::from([5, 7])), vec![5, 7]);
        assert_eq!(novelty.update(&BTreeSet::from([7, 9])), vec![9]);
        // 5 reappears after skipping a window
        assert_eq!(novelty.update(&BTreeSet::from([5, 9])), vec![5]);
    }

    #[test]
    fn test_novelty_full_history() {
        let mut novelty = InstanceNovelty::new(NoveltyPolicy::FullHistory);
        assert_eq!(novelty.update(&BTreeSet::from([5, 7])), vec![5, 7]);
        assert_eq!(novelty.update(&BTreeSet::from([7, 9])), vec![9]);
        assert!(novelty.update(&BTreeSet::from([5, 9])).is_empty());
    }

    #[test]
    fn test_subsample() {
        let items = (0..150).collect::<Vec<_>>();
        let sampled = subsample(&items, 100, &mut StdRng::seed_from_u64(7));
        assert_eq!(sampled.len(), 100);
        assert_eq!(sampled.iter().collect::<BTreeSet<_>>().len(), 100);
        assert_eq!(sampled, subsample(&items, 100, &mut StdRng::seed_from_u64(7)));
        assert_eq!(
            subsample(&items[..10], 100, &mut StdRng::seed_from_u64(7)),
            items[..10].to_vec()
        );
    }

    #[test]
    fn test_config_paths() {
        let config = ViewerConfig {
            dataset_root: PathBuf::from("/data/kitti360"),
            sequence: 3,
            ..Default::default()
        };
        assert_eq!(config.sequence_name(), "2013_05_28_drive_0003_sync");
        assert_eq!(
            config.windows_dir(),
            PathBuf::from("/data/kitti360/data_3d_semantics/2013_05_28_drive_0003_sync/static")
        );
        assert_eq!(
            config.output_dir(),
            PathBuf::from("/data/kitti360/data_3d_car_pointcloud/car")
        );
        assert_eq!(config.category_id().ok(), Some(26));
    }
}
