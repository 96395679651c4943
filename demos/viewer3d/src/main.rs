use argh::FromArgs;
use std::path::PathBuf;

use kitti360::k3d::{io::npy::read_npy_points, mesh::TriangleMesh};
use kitti360::scripts::viewer::{
    dataset_root_from_env, NoveltyPolicy, ViewerConfig, Viewer3D, VisualizationMode,
};

#[derive(FromArgs)]
/// Visualize the KITTI-360 point clouds and extract canonical car point clouds
struct Args {
    /// the sequence to visualize
    #[argh(option, default = "0")]
    sequence: usize,

    /// the modality to visualize: rgb, semantic, instance or bbox
    #[argh(option, default = "VisualizationMode::Semantic")]
    mode: VisualizationMode,

    /// the maximum number of bounding boxes to visualize
    #[argh(option, default = "100")]
    max_bbox: usize,

    /// read the dynamic windows instead of the static ones
    #[argh(switch)]
    dynamic: bool,

    /// keep only the visible car points
    #[argh(switch)]
    visible_only: bool,

    /// compare new instances against every previous window
    #[argh(switch)]
    full_history: bool,

    /// keep one point every k after filtering
    #[argh(option, default = "1")]
    downsample_every: usize,

    /// seed of the bounding box subsampling
    #[argh(option, default = "0")]
    seed: u64,

    /// show the camera trajectory
    #[argh(switch)]
    show_camera: bool,

    /// directory of the canonical point clouds
    #[argh(option)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = ViewerConfig {
        dataset_root: dataset_root_from_env(),
        sequence: args.sequence,
        mode: args.mode,
        max_bbox: args.max_bbox,
        show_static: !args.dynamic,
        visible_only: args.visible_only,
        novelty: if args.full_history {
            NoveltyPolicy::FullHistory
        } else {
            NoveltyPolicy::PreviousWindow
        },
        downsample_every: args.downsample_every,
        seed: args.seed,
        output_dir: args.output,
        ..Default::default()
    };

    let mut viewer = Viewer3D::new(config)?;

    // create a Rerun recording stream
    let rec = rerun::RecordingStreamBuilder::new("KITTI-360 Viewer").spawn()?;

    if args.show_camera {
        let trajectory = viewer.load_camera_trajectory()?;
        let line_set = &trajectory.line_set;
        let strips = line_set
            .segments()
            .iter()
            .map(|[a, b]| vec![to_f32(a), to_f32(b)])
            .collect::<Vec<_>>();
        rec.log_static(
            "world/camera",
            &rerun::LineStrips3D::new(strips)
                .with_colors([to_color(&line_set.colors.first().copied().unwrap_or_default())])
                .with_radii([line_set.radius as f32]),
        )?;
    }

    if args.mode == VisualizationMode::BBox {
        for (i, group) in viewer.bbox_groups()?.iter().enumerate() {
            log::info!(
                "Visualizing {:06}_{:06} with {} objects",
                group.window[0],
                group.window[1],
                group.meshes.len()
            );
            rec.set_time_sequence("window", i as i64);
            rec.log("world/bboxes", &merge_meshes(&group.meshes))?;
        }
        return Ok(());
    }

    let summary = viewer.extract_canonical_instances()?;
    println!(
        "Wrote #{} canonical point clouds, skipped #{} instances without a box",
        summary.written.len(),
        summary.skipped.len()
    );
    for (instance_id, err) in &summary.failed {
        eprintln!("Instance {instance_id} failed: {err}");
    }

    rec.log_static("world/bboxes", &merge_meshes(&viewer.bboxes))?;

    for (i, path) in viewer.list_windows()?.iter().enumerate() {
        let scene = viewer.load_scene_window(path)?;
        let colors = viewer.window_colors(&scene);

        rec.set_time_sequence("window", i as i64);
        rec.log(
            "world/scene",
            &rerun::Points3D::new(scene.pointcloud.points().iter().map(to_f32))
                .with_colors(colors.iter().map(to_color)),
        )?;
    }

    for instance in &summary.written {
        let points = read_npy_points(&instance.path)?;
        rec.log_static(
            format!("canonical/{}", instance.instance_id),
            &rerun::Points3D::new(points.iter().map(to_f32)),
        )?;
    }

    if !summary.failed.is_empty() {
        return Err(format!("{} instances could not be canonicalized", summary.failed.len()).into());
    }

    Ok(())
}

fn to_f32(p: &[f64; 3]) -> [f32; 3] {
    p.map(|v| v as f32)
}

fn to_color(c: &[f64; 3]) -> rerun::Color {
    let [r, g, b] = c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8);
    rerun::Color::from_rgb(r, g, b)
}

/// Concatenate meshes into one, offsetting the triangle indices.
fn merge_meshes(meshes: &[TriangleMesh]) -> rerun::Mesh3D {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut colors = Vec::new();
    let mut triangles = Vec::new();

    for mesh in meshes {
        let offset = positions.len() as u32;
        positions.extend(mesh.vertices.iter().map(to_f32));
        normals.extend(mesh.vertex_normals.iter().map(to_f32));
        colors.extend(mesh.vertex_colors.iter().map(to_color));
        triangles.extend(mesh.triangles.iter().map(|t| t.map(|i| i + offset)));
    }

    rerun::Mesh3D::new(positions)
        .with_triangle_indices(triangles)
        .with_vertex_normals(normals)
        .with_vertex_colors(colors)
}
