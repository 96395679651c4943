#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Reader for the 3d bounding box annotations.
pub mod annotation;

/// Color lookup for semantic, instance and timestamp visualization.
pub mod color;

/// Encoding of semantic and instance ids into global ids.
pub mod ids;

/// The KITTI-360 label definitions.
pub mod labels;

/// Camera poses and trajectory line segments.
pub mod trajectory;

/// The 3d viewer context: windows, bounding boxes and canonical extraction.
pub mod viewer;
