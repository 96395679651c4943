/// NPY array reader and writer module.
pub mod npy;

/// PLY reader module.
pub mod ply;

/// Plain text xyz writer module.
pub mod xyz;
