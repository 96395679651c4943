//! Mapping of world-space instance points into the local frame of their
//! annotated bounding box.
//!
//! An annotation stores the box as a 4x4 affine transform `M` whose linear
//! block is `R * diag(sx, sy, sz)` and whose last column is the box center
//! `T`. The engine recovers `R` by normalizing the columns of `M` with the box
//! extents measured on the mesh vertices, inverts it, and maps every point with
//! `p_box = R^-1 * (p - T)`. A fixed rotation of -90 degrees about the x axis
//! is applied last so that the canonical clouds share one orientation.

use glam::{DMat3, DVec3};

use crate::{
    linalg::{transform_points3d, LinalgError},
    ops::euclidean_distance,
    transforms::{mat3_to_rows, split_homogeneous},
};

/// Angle in degrees of the axis correction applied about the x axis.
pub const AXIS_CORRECTION_DEG: f64 = -90.0;

/// Extents smaller than this are treated as degenerate.
const MIN_EXTENT: f64 = 1e-12;

/// Determinants smaller than this are treated as singular.
const MIN_DETERMINANT: f64 = 1e-12;

/// Error types for the canonicalization.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CanonicalError {
    /// The mesh does not hold the 8 box corners.
    #[error("Expected at least 8 box vertices, got {0}")]
    NotEnoughVertices(usize),

    /// One of the box sides has zero (or non-finite) length.
    #[error("Degenerate box extent along {axis}: {value}")]
    DegenerateExtent {
        /// The box axis, one of `x`, `y`, `z`.
        axis: char,
        /// The measured extent.
        value: f64,
    },

    /// The normalized linear block cannot be inverted.
    #[error("Box rotation is singular (determinant {0})")]
    SingularRotation(f64),

    /// The mapping produced NaN or infinite coordinates.
    #[error("Canonical point {0} is not finite")]
    NonFinite(usize),

    /// Internal buffer error.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Rotation of [`AXIS_CORRECTION_DEG`] about the x axis.
pub fn axis_correction() -> DMat3 {
    DMat3::from_rotation_x(AXIS_CORRECTION_DEG.to_radians())
}

/// Measure the box side lengths `(sx, sy, sz)` from its corners.
///
/// `sx = |v0 - v5|`, `sy = |v0 - v2|` and `sz = |v0 - v1|`, following the
/// annotation corner ordering.
pub fn box_extents(vertices: &[[f64; 3]]) -> Result<[f64; 3], CanonicalError> {
    if vertices.len() < 8 {
        return Err(CanonicalError::NotEnoughVertices(vertices.len()));
    }

    let extents = [
        euclidean_distance(&vertices[0], &vertices[5]),
        euclidean_distance(&vertices[0], &vertices[2]),
        euclidean_distance(&vertices[0], &vertices[1]),
    ];

    for (axis, value) in ['x', 'y', 'z'].into_iter().zip(extents) {
        if !value.is_finite() || value < MIN_EXTENT {
            return Err(CanonicalError::DegenerateExtent { axis, value });
        }
    }

    Ok(extents)
}

/// The decomposition of a box transform into rotation, scale and translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    /// Unscaled rotation from box to world coordinates.
    pub rotation: DMat3,
    /// Side lengths `(sx, sy, sz)` of the box.
    pub scale: DVec3,
    /// Box center in world coordinates.
    pub translation: DVec3,
    // cached inverse of `rotation`
    rotation_inv: DMat3,
}

impl BoxFrame {
    /// Recover the frame of a box from its transform and its mesh corners.
    ///
    /// # Arguments
    ///
    /// * `transform` - Row-major box-to-world affine transform.
    /// * `vertices` - The 8 box corners in world coordinates.
    pub fn from_transform(
        transform: &[[f64; 4]; 4],
        vertices: &[[f64; 3]],
    ) -> Result<Self, CanonicalError> {
        let [sx, sy, sz] = box_extents(vertices)?;
        let (linear, translation) = split_homogeneous(transform);

        let rotation = DMat3::from_cols(
            linear.col(0) / sx,
            linear.col(1) / sy,
            linear.col(2) / sz,
        );

        let det = rotation.determinant();
        if !det.is_finite() || det.abs() < MIN_DETERMINANT {
            return Err(CanonicalError::SingularRotation(det));
        }

        Ok(Self {
            rotation,
            scale: DVec3::new(sx, sy, sz),
            translation,
            rotation_inv: rotation.inverse(),
        })
    }

    /// Inverse of the recovered rotation.
    pub fn rotation_inv(&self) -> DMat3 {
        self.rotation_inv
    }

    /// The world-to-canonical mapping as a row-major matrix and translation.
    ///
    /// The axis correction is folded in: `A = Rx * R^-1`, `b = -Rx * R^-1 * T`.
    pub fn world_to_canonical(&self) -> ([[f64; 3]; 3], [f64; 3]) {
        let linear = axis_correction() * self.rotation_inv;
        let translation = -(linear * self.translation);
        (mat3_to_rows(&linear), translation.to_array())
    }

    /// Map a canonical point back to world coordinates.
    pub fn to_world(&self, canonical: &[f64; 3]) -> [f64; 3] {
        let in_box = axis_correction().transpose() * DVec3::from_array(*canonical);
        (self.rotation * in_box + self.translation).to_array()
    }
}

/// Express a set of world points in the canonical frame of a box.
///
/// The output has the same number of points, in the same order, as the input.
///
/// # Errors
///
/// Fails with [`CanonicalError::NonFinite`] if any mapped coordinate is not
/// finite, which happens when the input contains NaN or infinite values.
pub fn canonicalize_points(
    points: &[[f64; 3]],
    frame: &BoxFrame,
) -> Result<Vec<[f64; 3]>, CanonicalError> {
    let (linear, translation) = frame.world_to_canonical();

    let mut canonical = vec![[0.0; 3]; points.len()];
    transform_points3d(points, &linear, &translation, &mut canonical)?;

    if let Some(idx) = canonical
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(CanonicalError::NonFinite(idx));
    }

    Ok(canonical)
}
