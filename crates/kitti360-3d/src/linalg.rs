/// Error types for the linalg module.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum LinalgError {
    /// Source and destination buffers differ in length.
    #[error("Source and destination point buffers differ in size: {0} vs {1}")]
    SizeMismatch(usize, usize),
}

/// Transform a set of points using a rotation and translation.
///
/// Computes `dst = dst_r_src * src + dst_t_src` for every point.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A row-major 3x3 matrix. It does not need to be orthonormal.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer to store the transformed points.
///
/// Example:
///
/// ```
/// use kitti360_3d::linalg::transform_points3d;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [0.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points3d(&src_points, &rotation, &translation, &mut dst_points).unwrap();
/// assert_eq!(dst_points, src_points);
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), LinalgError> {
    if src_points.len() != dst_points.len() {
        return Err(LinalgError::SizeMismatch(
            src_points.len(),
            dst_points.len(),
        ));
    }

    let num_points = src_points.len();

    // 3xN matrix where each column is a point
    let points_in_src = faer::Mat::<f64>::from_fn(3, num_points, |i, j| src_points[j][i]);
    let dst_r_src_mat = faer::Mat::<f64>::from_fn(3, 3, |i, j| dst_r_src[i][j]);

    let mut points_in_dst = faer::Mat::<f64>::zeros(3, num_points);
    let mut points_in_dst_view = points_in_dst.as_mut();

    faer::linalg::matmul::matmul(
        &mut points_in_dst_view,
        dst_r_src_mat.as_ref(),
        points_in_src.as_ref(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    for (j, dst) in dst_points.iter_mut().enumerate() {
        for (i, value) in dst.iter_mut().enumerate() {
            *value = points_in_dst[(i, j)] + dst_t_src[i];
        }
    }

    Ok(())
}
