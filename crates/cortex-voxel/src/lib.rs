//! Dense voxel grids and translation of physical positions into voxel indices.

pub mod field;
pub mod index;

pub use field::{VoxelError, VoxelField};
pub use index::{position_to_voxel_index, positions_to_voxel_indices, validate_voxel_dimensions};
