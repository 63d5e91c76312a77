//! Position to voxel index translation.

use glam::{DVec3, IVec3};

use crate::field::VoxelError;

/// Checks that every voxel dimension is finite and strictly positive.
pub fn validate_voxel_dimensions(voxel_dimensions: DVec3) -> Result<(), VoxelError> {
    if voxel_dimensions.is_finite() && voxel_dimensions.cmpgt(DVec3::ZERO).all() {
        Ok(())
    } else {
        Err(VoxelError::InvalidDimensions(voxel_dimensions))
    }
}

/// Voxel index of the voxel containing `position`, relative to the grid origin.
///
/// Each axis is `floor(position / voxel_dimensions)`, so positions just below
/// the origin map to `-1` rather than `0`. Non-finite components saturate
/// (NaN becomes `0`); [`VoxelField::voxel_index`](crate::VoxelField::voxel_index)
/// rejects such positions instead.
#[inline]
pub fn position_to_voxel_index(position: DVec3, voxel_dimensions: DVec3) -> IVec3 {
    (position / voxel_dimensions).floor().as_ivec3()
}

/// Translates a batch of positions into voxel indices.
///
/// # Errors
///
/// Returns [`VoxelError::InvalidDimensions`] if `voxel_dimensions` has a zero,
/// negative, or non-finite component.
pub fn positions_to_voxel_indices(
    positions: &[DVec3],
    voxel_dimensions: DVec3,
) -> Result<Vec<IVec3>, VoxelError> {
    validate_voxel_dimensions(voxel_dimensions)?;
    Ok(positions
        .iter()
        .map(|&p| position_to_voxel_index(p, voxel_dimensions))
        .collect())
}
