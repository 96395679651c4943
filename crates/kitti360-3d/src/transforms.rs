use glam::{DMat3, DVec3};

/// Convert a glam matrix into row-major nested arrays.
pub fn mat3_to_rows(mat: &DMat3) -> [[f64; 3]; 3] {
    [
        mat.row(0).to_array(),
        mat.row(1).to_array(),
        mat.row(2).to_array(),
    ]
}

/// Split a row-major 4x4 homogeneous transform into its 3x3 linear block and
/// its translation column.
///
/// The bottom row is ignored.
pub fn split_homogeneous(transform: &[[f64; 4]; 4]) -> (DMat3, DVec3) {
    let linear = DMat3::from_cols(
        DVec3::new(transform[0][0], transform[1][0], transform[2][0]),
        DVec3::new(transform[0][1], transform[1][1], transform[2][1]),
        DVec3::new(transform[0][2], transform[1][2], transform[2][2]),
    );
    let translation = DVec3::new(transform[0][3], transform[1][3], transform[2][3]);
    (linear, translation)
}

/// Assemble a row-major 4x4 homogeneous transform from a linear block and a translation.
pub fn compose_homogeneous(linear: &DMat3, translation: &DVec3) -> [[f64; 4]; 4] {
    let rows = mat3_to_rows(linear);
    [
        [rows[0][0], rows[0][1], rows[0][2], translation.x],
        [rows[1][0], rows[1][1], rows[1][2], translation.y],
        [rows[2][0], rows[2][1], rows[2][2], translation.z],
        [0.0, 0.0, 0.0, 1.0],
    ]
}
