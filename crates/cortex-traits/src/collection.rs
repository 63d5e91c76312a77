//! The distribution collection: voxel field, probability table, trait table.

use std::sync::Arc;

use cortex_voxel::{VoxelField, validate_voxel_dimensions};
use glam::{DVec3, IVec3};

use crate::error::TraitsError;
use crate::probability::ProbabilityTable;
use crate::traits_table::TraitTable;

/// Field value meaning "no distribution group covers this voxel".
///
/// Every other field value must be a valid group (column) index.
pub const NO_DISTRIBUTION: u32 = u32::MAX;

/// Spatially varying probability distributions over a set of traits.
///
/// Immutable once built. [`reduce`] and [`split`] derive new collections that
/// share the voxel field and own fresh tables.
///
/// [`reduce`]: Self::reduce_distribution_collection
/// [`split`]: Self::split_distribution_collection
#[derive(Clone, Debug)]
pub struct SpatialDistribution {
    field: Option<Arc<VoxelField<u32>>>,
    distributions: ProbabilityTable,
    traits: TraitTable,
    voxel_dimensions: DVec3,
}

impl SpatialDistribution {
    /// Bundles a field, probability table and traits table.
    ///
    /// `field` may be `None` for collections that are only reshaped, never
    /// sampled; every sample then reports no distribution.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::ShapeMismatch`] if the tables disagree on the
    /// number of traits, [`TraitsError::InvalidFieldGroup`] if a field cell is
    /// neither a group index nor [`NO_DISTRIBUTION`], or [`TraitsError::Voxel`]
    /// for invalid voxel dimensions.
    pub fn new(
        field: Option<VoxelField<u32>>,
        distributions: ProbabilityTable,
        traits: TraitTable,
        voxel_dimensions: DVec3,
    ) -> Result<Self, TraitsError> {
        if traits.len() != distributions.num_rows() {
            return Err(TraitsError::ShapeMismatch {
                traits: traits.len(),
                distributions: distributions.num_rows(),
            });
        }
        validate_voxel_dimensions(voxel_dimensions)?;
        if let Some(field) = &field {
            let groups = distributions.num_columns();
            if let Some((cell, &group)) = field
                .iter()
                .enumerate()
                .find(|&(_, &g)| g != NO_DISTRIBUTION && g as usize >= groups)
            {
                return Err(TraitsError::InvalidFieldGroup {
                    cell,
                    group,
                    groups,
                });
            }
        }
        Ok(Self {
            field: field.map(Arc::new),
            distributions,
            traits,
            voxel_dimensions,
        })
    }

    /// Builds a sibling collection over the same field.
    pub(crate) fn derive(&self, distributions: ProbabilityTable, traits: TraitTable) -> Self {
        debug_assert_eq!(traits.len(), distributions.num_rows());
        Self {
            field: self.field.clone(),
            distributions,
            traits,
            voxel_dimensions: self.voxel_dimensions,
        }
    }

    /// The voxel field of group indices, if any.
    pub fn field(&self) -> Option<&VoxelField<u32>> {
        self.field.as_deref()
    }

    /// The probability table (traits x groups).
    pub fn distributions(&self) -> &ProbabilityTable {
        &self.distributions
    }

    /// The traits table.
    pub fn traits(&self) -> &TraitTable {
        &self.traits
    }

    /// Physical size of one voxel.
    pub fn voxel_dimensions(&self) -> DVec3 {
        self.voxel_dimensions
    }

    /// Distribution group of the voxel at `index`, or `None` if the voxel is
    /// outside the field or holds [`NO_DISTRIBUTION`].
    pub fn group_at(&self, index: IVec3) -> Option<usize> {
        let group = *self.field.as_ref()?.get(index)? as usize;
        (group < self.distributions.num_columns()).then_some(group)
    }

    /// Distribution group covering `position`, using explicit voxel dimensions.
    pub fn group_for_position(&self, position: DVec3, voxel_dimensions: DVec3) -> Option<usize> {
        let field = self.field.as_ref()?;
        self.group_at(field.voxel_index(position, voxel_dimensions)?)
    }

    /// Row positions ordered by descending total mass; ties keep table order.
    pub(crate) fn rows_by_descending_mass(&self) -> Vec<usize> {
        let mass: Vec<f64> = (0..self.traits.len())
            .map(|r| self.distributions.row_sum(r))
            .collect();
        let mut order: Vec<usize> = (0..mass.len()).collect();
        order.sort_by(|&a, &b| mass[b].total_cmp(&mass[a]));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn two_group_collection() -> SpatialDistribution {
        let field = VoxelField::new(
            UVec3::new(3, 1, 1),
            DVec3::ZERO,
            vec![0, 1, NO_DISTRIBUTION],
        )
        .unwrap();
        let distributions =
            ProbabilityTable::from_rows(vec![vec![0.5, 0.0], vec![0.5, 1.0]]).unwrap();
        let traits =
            TraitTable::from_rows(["name"], vec![vec!["a".into()], vec!["b".into()]]).unwrap();
        SpatialDistribution::new(Some(field), distributions, traits, DVec3::splat(10.0)).unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let distributions = ProbabilityTable::from_rows(vec![vec![1.0]]).unwrap();
        let traits = TraitTable::new(["name"]).unwrap();
        let result = SpatialDistribution::new(None, distributions, traits, DVec3::ONE);
        assert_eq!(
            result.unwrap_err(),
            TraitsError::ShapeMismatch {
                traits: 0,
                distributions: 1
            }
        );
    }

    #[test]
    fn test_out_of_range_field_group_rejected() {
        let field = VoxelField::new(UVec3::new(3, 1, 1), DVec3::ZERO, vec![0, 2, NO_DISTRIBUTION])
            .unwrap();
        let distributions =
            ProbabilityTable::from_rows(vec![vec![0.5, 0.0], vec![0.5, 1.0]]).unwrap();
        let traits =
            TraitTable::from_rows(["name"], vec![vec!["a".into()], vec!["b".into()]]).unwrap();
        assert_eq!(
            SpatialDistribution::new(Some(field), distributions, traits, DVec3::ONE).unwrap_err(),
            TraitsError::InvalidFieldGroup {
                cell: 1,
                group: 2,
                groups: 2
            }
        );
    }

    #[test]
    fn test_group_lookup() {
        let sd = two_group_collection();
        let dims = sd.voxel_dimensions();
        assert_eq!(sd.group_for_position(DVec3::new(1.0, 1.0, 1.0), dims), Some(0));
        assert_eq!(sd.group_for_position(DVec3::new(15.0, 1.0, 1.0), dims), Some(1));
        assert_eq!(sd.group_for_position(DVec3::new(25.0, 1.0, 1.0), dims), None);
        assert_eq!(sd.group_for_position(DVec3::new(-1.0, 1.0, 1.0), dims), None);
    }

    #[test]
    fn test_no_field_has_no_groups() {
        let sd = SpatialDistribution::new(
            None,
            ProbabilityTable::from_rows(vec![vec![1.0]]).unwrap(),
            TraitTable::from_rows(["name"], vec![vec!["a".into()]]).unwrap(),
            DVec3::ONE,
        )
        .unwrap();
        assert_eq!(sd.group_at(IVec3::ZERO), None);
    }

    #[test]
    fn test_rows_by_descending_mass_is_stable() {
        let sd = SpatialDistribution::new(
            None,
            ProbabilityTable::from_rows(vec![vec![0.2], vec![0.4], vec![0.4]]).unwrap(),
            TraitTable::from_rows(
                ["name"],
                vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]],
            )
            .unwrap(),
            DVec3::ONE,
        )
        .unwrap();
        assert_eq!(sd.rows_by_descending_mass(), vec![1, 2, 0]);
    }
}
