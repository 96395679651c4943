use crate::pointcloud::PointCloud;

/// Utility function to compute the Euclidean distance between two points.
///
/// # Arguments
///
/// * `a` - A point in 3D space.
/// * `b` - Another point in 3D space.
///
/// # Returns
///
/// The Euclidean distance between the two points.
///
/// Example:
/// ```
/// use kitti360_3d::ops::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let dst = euclidean_distance(&a, &b);
/// ```
pub fn euclidean_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Fit a set of points into the cube `[-0.5, 0.5]^3`.
///
/// The points are divided by the largest side of their axis aligned bounding
/// box and then centered on the middle of that box. The aspect ratio is kept.
///
/// A cloud whose largest side is zero (empty or a single repeated point) is
/// returned unchanged.
pub fn normalize_points(points: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let pointcloud = PointCloud::new(points.to_vec(), None, None);
    let size = pointcloud.get_max_bound() - pointcloud.get_min_bound();
    let max_size = size.max_element();

    if max_size <= 0.0 || !max_size.is_finite() {
        return points.to_vec();
    }

    let scaled = points
        .iter()
        .map(|p| [p[0] / max_size, p[1] / max_size, p[2] / max_size])
        .collect::<Vec<_>>();
    let scaled = PointCloud::new(scaled, None, None);
    let center = (scaled.get_max_bound() + scaled.get_min_bound()) / 2.0;

    scaled
        .points()
        .iter()
        .map(|p| [p[0] - center.x, p[1] - center.y, p[2] - center.z])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_distance() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_relative_eq!(euclidean_distance(&a, &b), 5.196152, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_points() {
        let points = vec![[0.0, 0.0, 0.0], [4.0, 2.0, 1.0], [2.0, 1.0, 0.5]];
        let normalized = normalize_points(&points);

        assert_eq!(normalized.len(), 3);
        assert_relative_eq!(normalized[0][0], -0.5);
        assert_relative_eq!(normalized[1][0], 0.5);
        assert_relative_eq!(normalized[0][1], -0.25);
        assert_relative_eq!(normalized[1][1], 0.25);
        assert_relative_eq!(normalized[2][0], 0.0);
        assert_relative_eq!(normalized[2][2], 0.0);
    }

    #[test]
    fn test_normalize_points_degenerate() {
        let points = vec![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        assert_eq!(normalize_points(&points), points);
        assert!(normalize_points(&[]).is_empty());
    }
}
