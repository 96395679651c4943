use argh::FromArgs;
use std::path::PathBuf;

use kitti360::k3d::{
    io::{npy::read_npy_points, xyz::write_xyz_txt},
    ops::normalize_points,
    pointcloud::PointCloud,
};

#[derive(FromArgs)]
/// Normalize a canonical point cloud and show it with its bounding box
struct Args {
    /// path to the canonical .npy file
    #[argh(option)]
    npy_path: PathBuf,

    /// path of the exported xyz text file
    #[argh(option, default = "PathBuf::from(\"scene1.txt\")")]
    xyz_path: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let points = read_npy_points(&args.npy_path)?;
    println!("Read #{} points", points.len());

    let normalized = normalize_points(&points);
    write_xyz_txt(&args.xyz_path, &normalized)?;
    log::info!("Wrote {}", args.xyz_path.display());

    let pointcloud = PointCloud::new(normalized, None, None);
    let min = pointcloud.get_min_bound();
    let max = pointcloud.get_max_bound();
    let center = (min + max) * 0.5;
    let size = max - min;

    // create a Rerun recording stream
    let rec = rerun::RecordingStreamBuilder::new("Canonical Preview").spawn()?;

    rec.log(
        "pointcloud",
        &rerun::Points3D::new(
            pointcloud
                .points()
                .iter()
                .map(|p| rerun::Position3D::new(p[0] as f32, p[1] as f32, p[2] as f32)),
        ),
    )?;

    rec.log(
        "aabb",
        &rerun::Boxes3D::from_centers_and_sizes(
            [center.as_vec3().to_array()],
            [size.as_vec3().to_array()],
        )
        .with_colors([[255u8, 0, 0]]),
    )?;

    Ok(())
}
