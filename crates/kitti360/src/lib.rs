#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use kitti360_3d as k3d;

#[doc(inline)]
pub use kitti360_scripts as scripts;
