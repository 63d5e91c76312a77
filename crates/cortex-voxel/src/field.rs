//! Dense 3-D voxel grid anchored at a world-space offset.
//!
//! A [`VoxelField`] stores one value per voxel in x-fastest order. Lookups
//! outside the grid return `None` rather than panicking, so callers can treat
//! "position not covered" as ordinary data.

use glam::{DVec3, IVec3, UVec3};
use thiserror::Error;

use crate::index::position_to_voxel_index;

/// Errors that can occur when building a field or translating positions.
#[derive(Debug, Error, PartialEq)]
pub enum VoxelError {
    /// Every voxel dimension must be finite and strictly positive.
    #[error("voxel dimensions must be positive and finite, got {0}")]
    InvalidDimensions(DVec3),
    /// The flat cell buffer does not match the requested grid shape.
    #[error("field of shape {shape} needs {expected} cells, got {actual}")]
    CellCountMismatch {
        /// Requested grid shape.
        shape: UVec3,
        /// `shape.x * shape.y * shape.z`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// Dense voxel grid of `T` values.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelField<T> {
    /// Number of voxels along each axis.
    shape: UVec3,
    /// World-space position of the corner of voxel `(0, 0, 0)`.
    offset: DVec3,
    /// Values in x-fastest order: `x + y * sx + z * sx * sy`.
    cells: Vec<T>,
}

impl<T> VoxelField<T> {
    /// Creates a field from a flat, x-fastest cell buffer.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::CellCountMismatch`] if `cells.len()` differs from
    /// the number of voxels in `shape`.
    pub fn new(shape: UVec3, offset: DVec3, cells: Vec<T>) -> Result<Self, VoxelError> {
        let expected = shape.x as usize * shape.y as usize * shape.z as usize;
        if cells.len() != expected {
            return Err(VoxelError::CellCountMismatch {
                shape,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            shape,
            offset,
            cells,
        })
    }

    /// Creates a field with every voxel set to `value`.
    pub fn filled(shape: UVec3, offset: DVec3, value: T) -> Self
    where
        T: Clone,
    {
        let len = shape.x as usize * shape.y as usize * shape.z as usize;
        Self {
            shape,
            offset,
            cells: vec![value; len],
        }
    }

    /// Returns the grid shape.
    pub fn shape(&self) -> UVec3 {
        self.shape
    }

    /// Returns the world-space offset of the grid origin.
    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    /// Returns the total number of voxels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the grid has no voxels.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if `index` addresses a voxel inside the grid.
    pub fn in_bounds(&self, index: IVec3) -> bool {
        index.cmpge(IVec3::ZERO).all() && index.as_uvec3().cmplt(self.shape).all()
    }

    /// Returns the value at `index`, or `None` outside the grid.
    pub fn get(&self, index: IVec3) -> Option<&T> {
        if !self.in_bounds(index) {
            return None;
        }
        self.cells.get(self.linear_index(index.as_uvec3()))
    }

    /// Replaces the value at `index`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, index: IVec3, value: T) {
        if !self.in_bounds(index) {
            tracing::warn!("VoxelField::set out of bounds: {}", index);
            return;
        }
        let linear = self.linear_index(index.as_uvec3());
        self.cells[linear] = value;
    }

    /// Translates a world-space position into this grid's voxel index.
    ///
    /// The result may lie outside the grid; pass it to [`get`](Self::get).
    /// Returns `None` for a NaN or infinite position, which no voxel covers.
    /// `voxel_dimensions` must be positive (see
    /// [`validate_voxel_dimensions`](crate::validate_voxel_dimensions)).
    pub fn voxel_index(&self, position: DVec3, voxel_dimensions: DVec3) -> Option<IVec3> {
        if !position.is_finite() {
            return None;
        }
        Some(position_to_voxel_index(
            position - self.offset,
            voxel_dimensions,
        ))
    }

    /// Returns the value of the voxel containing `position`, if covered.
    pub fn lookup(&self, position: DVec3, voxel_dimensions: DVec3) -> Option<&T> {
        self.get(self.voxel_index(position, voxel_dimensions)?)
    }

    /// Iterates over all cell values in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    fn linear_index(&self, index: UVec3) -> usize {
        debug_assert!(index.cmplt(self.shape).all());
        let (sx, sy) = (self.shape.x as usize, self.shape.y as usize);
        index.x as usize + index.y as usize * sx + index.z as usize * sx * sy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_field(shape: UVec3) -> VoxelField<u32> {
        let len = (shape.x * shape.y * shape.z) as usize;
        VoxelField::new(shape, DVec3::ZERO, (0..len as u32).collect()).unwrap()
    }

    #[test]
    fn test_cells_are_x_fastest() {
        let field = counting_field(UVec3::new(2, 3, 4));
        assert_eq!(field.get(IVec3::new(1, 0, 0)), Some(&1));
        assert_eq!(field.get(IVec3::new(0, 1, 0)), Some(&2));
        assert_eq!(field.get(IVec3::new(0, 0, 1)), Some(&6));
        assert_eq!(field.get(IVec3::new(1, 2, 3)), Some(&23));
    }

    #[test]
    fn test_out_of_bounds_get_is_none() {
        let field = counting_field(UVec3::new(2, 2, 2));
        assert_eq!(field.get(IVec3::new(2, 0, 0)), None);
        assert_eq!(field.get(IVec3::new(0, -1, 0)), None);
        assert_eq!(field.get(IVec3::new(0, 0, 99)), None);
    }

    #[test]
    fn test_cell_count_mismatch_rejected() {
        let result = VoxelField::new(UVec3::new(2, 2, 2), DVec3::ZERO, vec![0u32; 7]);
        assert_eq!(
            result.unwrap_err(),
            VoxelError::CellCountMismatch {
                shape: UVec3::new(2, 2, 2),
                expected: 8,
                actual: 7,
            }
        );
    }

    #[test]
    fn test_lookup_applies_offset() {
        let field = VoxelField::new(
            UVec3::new(2, 1, 1),
            DVec3::new(100.0, 0.0, 0.0),
            vec![7u32, 9],
        )
        .unwrap();
        let dims = DVec3::splat(10.0);
        assert_eq!(field.lookup(DVec3::new(101.0, 5.0, 5.0), dims), Some(&7));
        assert_eq!(field.lookup(DVec3::new(115.0, 5.0, 5.0), dims), Some(&9));
        assert_eq!(field.lookup(DVec3::new(99.0, 5.0, 5.0), dims), None);
    }

    #[test]
    fn test_non_finite_position_has_no_voxel() {
        let field = VoxelField::filled(UVec3::ONE, DVec3::ZERO, 1u32);
        let dims = DVec3::ONE;
        assert_eq!(field.lookup(DVec3::new(0.5, 0.5, 0.5), dims), Some(&1));
        for position in [
            DVec3::splat(f64::NAN),
            DVec3::new(0.5, f64::NAN, 0.5),
            DVec3::new(f64::INFINITY, 0.5, 0.5),
            DVec3::new(0.5, 0.5, f64::NEG_INFINITY),
        ] {
            assert_eq!(field.voxel_index(position, dims), None, "{position}");
            assert_eq!(field.lookup(position, dims), None, "{position}");
        }
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut field = VoxelField::filled(UVec3::ONE, DVec3::ZERO, 0u32);
        field.set(IVec3::new(1, 0, 0), 5);
        field.set(IVec3::ZERO, 3);
        assert_eq!(field.iter().copied().collect::<Vec<_>>(), vec![3]);
    }
}
