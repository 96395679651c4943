use std::path::Path;

use kitti360_3d::{mesh::LineSet, ops::euclidean_distance};

/// Color of the camera path.
pub const TRAJECTORY_COLOR: [f64; 3] = [0.75, 0.0, 0.0];

/// Rendering radius of the camera path.
pub const TRAJECTORY_RADIUS: f64 = 1.5;

/// Error types for the trajectory module.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    /// Failed to read the pose file
    #[error("Failed to read pose file")]
    Io(#[from] std::io::Error),

    /// A row does not hold a frame index and 16 values
    #[error("Malformed pose at line {line}: {reason}")]
    MalformedRow {
        /// One-based line number.
        line: usize,
        /// What is wrong with the row.
        reason: String,
    },
}

/// The pose of the camera at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Frame index.
    pub frame: i32,
    /// Row-major camera-to-world transform.
    pub cam_to_world: [[f64; 4]; 4],
}

impl CameraPose {
    /// Camera center in world coordinates.
    pub fn position(&self) -> [f64; 3] {
        [
            self.cam_to_world[0][3],
            self.cam_to_world[1][3],
            self.cam_to_world[2][3],
        ]
    }
}

/// Read a `cam0_to_world.txt` file.
///
/// Each non-empty line holds the frame index followed by the 16 row-major
/// values of the camera-to-world transform.
pub fn read_cam_to_world(path: impl AsRef<Path>) -> Result<Vec<CameraPose>, TrajectoryError> {
    let text = std::fs::read_to_string(path)?;
    let mut poses = Vec::new();

    for (idx, row) in text.lines().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let malformed = |reason: String| TrajectoryError::MalformedRow {
            line: idx + 1,
            reason,
        };

        let values = row
            .split_whitespace()
            .map(|v| v.parse::<f64>().map_err(|_| malformed(format!("bad value {v}"))))
            .collect::<Result<Vec<_>, _>>()?;

        let [frame, matrix @ ..] = values.as_slice() else {
            return Err(malformed("empty row".into()));
        };
        if matrix.len() != 16 {
            return Err(malformed(format!("expected 16 values, found {}", matrix.len())));
        }

        let mut cam_to_world = [[0.0; 4]; 4];
        for (i, row) in cam_to_world.iter_mut().enumerate() {
            row.copy_from_slice(&matrix[i * 4..i * 4 + 4]);
        }

        poses.push(CameraPose {
            frame: *frame as i32,
            cam_to_world,
        });
    }

    Ok(poses)
}

/// The path travelled by the camera.
#[derive(Debug, Clone)]
pub struct CameraTrajectory {
    /// Consecutive camera centers joined by segments.
    pub line_set: LineSet,
    /// Total travelled distance.
    pub distance: f64,
    /// Number of poses.
    pub num_frames: usize,
}

impl CameraTrajectory {
    /// Join consecutive camera centers into segments.
    pub fn from_poses(poses: &[CameraPose]) -> Self {
        let points = poses.iter().map(CameraPose::position).collect::<Vec<_>>();

        let distance: f64 = points
            .windows(2)
            .map(|w| euclidean_distance(&w[0], &w[1]))
            .sum();

        let lines = (1..points.len() as u32).map(|i| [i - 1, i]).collect();

        Self {
            num_frames: points.len(),
            line_set: LineSet::new(points, lines, TRAJECTORY_COLOR, TRAJECTORY_RADIUS),
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pose_row(frame: i32, t: [f64; 3]) -> String {
        format!(
            "{frame} 1 0 0 {} 0 1 0 {} 0 0 1 {} 0 0 0 1",
            t[0], t[1], t[2]
        )
    }

    #[test]
    fn test_read_and_build() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cam0_to_world.txt");
        let rows = [
            pose_row(5, [0.0, 0.0, 0.0]),
            pose_row(6, [3.0, 4.0, 0.0]),
            String::new(),
            pose_row(8, [3.0, 4.0, 12.0]),
        ];
        std::fs::write(&path, rows.join("\n"))?;

        let poses = read_cam_to_world(&path)?;
        assert_eq!(poses.len(), 3);
        assert_eq!(poses[1].frame, 6);
        assert_eq!(poses[2].position(), [3.0, 4.0, 12.0]);

        let trajectory = CameraTrajectory::from_poses(&poses);
        assert_eq!(trajectory.num_frames, 3);
        assert_eq!(trajectory.line_set.lines, vec![[0, 1], [1, 2]]);
        assert_eq!(trajectory.line_set.colors, vec![TRAJECTORY_COLOR; 2]);
        assert_relative_eq!(trajectory.line_set.radius, 1.5);
        assert_relative_eq!(trajectory.distance, 17.0);
        Ok(())
    }

    #[test]
    fn test_malformed_row() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cam0_to_world.txt");
        std::fs::write(&path, format!("{}\n7 1 0 0", pose_row(0, [0.0; 3])))?;

        match read_cam_to_world(&path) {
            Err(TrajectoryError::MalformedRow { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a malformed row, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_single_pose_has_no_segments() {
        let pose = CameraPose {
            frame: 0,
            cam_to_world: [[0.0; 4]; 4],
        };
        let trajectory = CameraTrajectory::from_poses(&[pose]);
        assert!(trajectory.line_set.lines.is_empty());
        assert_eq!(trajectory.distance, 0.0);
    }
}
