//! Conditional trait assignment: sample a trait compatible with attributes
//! an entity already carries.

use glam::DVec3;
use rand::Rng;

use crate::attribute::AttributeValue;
use crate::collection::SpatialDistribution;
use crate::error::TraitsError;
use crate::sampler::{EntitySampler, weighted_choice};

/// Flat integer encoding of [`Assignment::Unassigned`], for callers that store
/// assignments as trait indices.
pub const UNASSIGNED_SENTINEL: i64 = -1;

/// Why an entity could not be given a trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unassigned {
    /// The entity's voxel is outside the field or has no distribution group.
    NoDistribution,
    /// No trait row matches the preassigned attribute values.
    NoCompatibleTrait,
    /// Compatible rows exist but carry no mass in the entity's group.
    ZeroProbability,
}

/// Outcome of sampling one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assignment {
    /// Row position in the collection's traits table.
    Trait(usize),
    /// No valid assignment exists.
    Unassigned(Unassigned),
}

impl Assignment {
    /// The assigned row, if any.
    pub fn trait_index(self) -> Option<usize> {
        match self {
            Self::Trait(row) => Some(row),
            Self::Unassigned(_) => None,
        }
    }

    /// Returns `true` if a trait was assigned.
    pub fn is_assigned(self) -> bool {
        matches!(self, Self::Trait(_))
    }

    /// The row as `i64`, or [`UNASSIGNED_SENTINEL`].
    pub fn to_sentinel(self) -> i64 {
        match self {
            Self::Trait(row) => row as i64,
            Self::Unassigned(_) => UNASSIGNED_SENTINEL,
        }
    }
}

/// Counts of assignment outcomes over a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssignmentSummary {
    /// Entities that received a trait.
    pub assigned: usize,
    /// Entities outside every distribution group.
    pub no_distribution: usize,
    /// Entities whose constraints matched no trait.
    pub no_compatible_trait: usize,
    /// Entities whose compatible traits had no mass in their group.
    pub zero_probability: usize,
}

impl AssignmentSummary {
    /// Tallies a batch of assignments.
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        let mut summary = Self::default();
        for a in assignments {
            match a {
                Assignment::Trait(_) => summary.assigned += 1,
                Assignment::Unassigned(Unassigned::NoDistribution) => summary.no_distribution += 1,
                Assignment::Unassigned(Unassigned::NoCompatibleTrait) => {
                    summary.no_compatible_trait += 1
                }
                Assignment::Unassigned(Unassigned::ZeroProbability) => {
                    summary.zero_probability += 1
                }
            }
        }
        summary
    }

    /// Entities left without a trait.
    pub fn unassigned(&self) -> usize {
        self.no_distribution + self.no_compatible_trait + self.zero_probability
    }
}

/// Attribute values already fixed for one entity.
///
/// Setting the same attribute twice keeps the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preassigned {
    constraints: Vec<(String, AttributeValue)>,
}

impl Preassigned {
    /// No constraints: every trait is compatible.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single constraint.
    pub fn single(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new().with(attribute, value)
    }

    /// Adds or replaces a constraint.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let attribute = attribute.into();
        let value = value.into();
        match self.constraints.iter_mut().find(|(a, _)| *a == attribute) {
            Some(slot) => slot.1 = value,
            None => self.constraints.push((attribute, value)),
        }
        self
    }

    /// Number of constrained attributes.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if nothing is constrained.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.constraints.iter().map(|(a, v)| (a.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Preassigned {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (attribute, value)| acc.with(attribute, value))
    }
}

/// Constraints resolved to column positions of one traits table.
type Resolved<'a> = Vec<(usize, &'a AttributeValue)>;

impl SpatialDistribution {
    /// Draws a trait for the entity at `position` that agrees with every
    /// value in `preassigned`.
    ///
    /// The entity's group column is resolved through the field, trait rows are
    /// filtered to exact matches, and one match is drawn weighted by its mass
    /// in that column. An unknown attribute *value* simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::UnknownAttribute`] if `preassigned` names an
    /// attribute outside the traits schema.
    pub fn assign_conditional<R: Rng + ?Sized>(
        &self,
        position: DVec3,
        preassigned: &Preassigned,
        rng: &mut R,
    ) -> Result<Assignment, TraitsError> {
        let constraints = self.resolve(preassigned)?;
        Ok(self.draw_compatible(position, &constraints, rng))
    }

    /// Runs [`assign_conditional`](Self::assign_conditional) for a batch of
    /// entities, one RNG stream per entity. Output follows input order.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::LengthMismatch`] if the slices differ in length,
    /// or [`TraitsError::UnknownAttribute`] for any malformed constraint.
    pub fn assign_conditional_batch(
        &self,
        positions: &[DVec3],
        preassigned: &[Preassigned],
        sampler: &EntitySampler,
    ) -> Result<Vec<Assignment>, TraitsError> {
        if positions.len() != preassigned.len() {
            return Err(TraitsError::LengthMismatch {
                positions: positions.len(),
                preassigned: preassigned.len(),
            });
        }
        let constraints = preassigned
            .iter()
            .map(|p| self.resolve(p))
            .collect::<Result<Vec<_>, _>>()?;

        let assignments = sampler.map_entities(positions.len(), |entity, rng| {
            self.draw_compatible(positions[entity], &constraints[entity], rng)
        });

        let summary = AssignmentSummary::from_assignments(&assignments);
        tracing::debug!(
            entities = positions.len(),
            assigned = summary.assigned,
            no_compatible_trait = summary.no_compatible_trait,
            zero_probability = summary.zero_probability,
            "conditional assignment"
        );
        Ok(assignments)
    }

    fn resolve<'a>(&self, preassigned: &'a Preassigned) -> Result<Resolved<'a>, TraitsError> {
        preassigned
            .iter()
            .map(|(attribute, value)| {
                self.traits()
                    .attribute_position(attribute)
                    .map(|column| (column, value))
            })
            .collect()
    }

    fn draw_compatible<R: Rng + ?Sized>(
        &self,
        position: DVec3,
        constraints: &[(usize, &AttributeValue)],
        rng: &mut R,
    ) -> Assignment {
        let Some(group) = self.group_for_position(position, self.voxel_dimensions()) else {
            return Assignment::Unassigned(Unassigned::NoDistribution);
        };

        let traits = self.traits();
        let candidates: Vec<usize> = (0..traits.len())
            .filter(|&row| {
                constraints
                    .iter()
                    .all(|&(column, value)| traits.value(row, column) == value)
            })
            .collect();
        if candidates.is_empty() {
            return Assignment::Unassigned(Unassigned::NoCompatibleTrait);
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|&row| self.distributions().get(row, group))
            .collect();
        match weighted_choice(&weights, rng) {
            Some(i) => Assignment::Trait(candidates[i]),
            None => Assignment::Unassigned(Unassigned::ZeroProbability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::ProbabilityTable;
    use crate::sampler::entity_rng;
    use crate::traits_table::TraitTable;
    use cortex_voxel::VoxelField;
    use glam::UVec3;

    fn xyz() -> SpatialDistribution {
        SpatialDistribution::new(
            Some(VoxelField::new(UVec3::ONE, DVec3::ZERO, vec![0]).unwrap()),
            ProbabilityTable::from_rows(vec![vec![0.75], vec![0.25], vec![0.0]]).unwrap(),
            TraitTable::from_rows(
                ["name", "type", "color"],
                vec![
                    vec!["a".into(), "x".into(), AttributeValue::Int(0)],
                    vec!["b".into(), "y".into(), AttributeValue::Int(0)],
                    vec!["c".into(), "z".into(), AttributeValue::Int(1)],
                ],
            )
            .unwrap(),
            DVec3::splat(25.0),
        )
        .unwrap()
    }

    fn check(preassigned: Preassigned, expected: i64) {
        let sd = xyz();
        let mut rng = entity_rng(0, 0);
        let chosen = sd
            .assign_conditional(DVec3::new(1.0, 1.0, 1.0), &preassigned, &mut rng)
            .unwrap();
        assert_eq!(chosen.to_sentinel(), expected, "preassigned {preassigned:?}");
    }

    #[test]
    fn test_single_attribute() {
        check(Preassigned::single("type", "x"), 0);
        check(Preassigned::single("type", "y"), 1);
    }

    #[test]
    fn test_multiple_attributes() {
        check(Preassigned::single("type", "x").with("color", 0i64), 0);
        check(Preassigned::single("type", "y").with("color", 0i64), 1);
    }

    #[test]
    fn test_unknown_value_is_unassigned() {
        check(Preassigned::single("type", "unknown"), UNASSIGNED_SENTINEL);
        check(
            Preassigned::single("type", "unknown").with("color", 0i64),
            UNASSIGNED_SENTINEL,
        );
    }

    #[test]
    fn test_zero_probability_is_unassigned() {
        check(Preassigned::single("type", "z"), UNASSIGNED_SENTINEL);
        check(
            Preassigned::single("type", "z").with("color", 1i64),
            UNASSIGNED_SENTINEL,
        );
    }

    #[test]
    fn test_impossible_combination_is_unassigned() {
        check(
            Preassigned::single("name", "a").with("type", "y"),
            UNASSIGNED_SENTINEL,
        );
    }

    #[test]
    fn test_failure_reasons_are_distinguished() {
        let sd = xyz();
        let mut rng = entity_rng(0, 0);
        let here = DVec3::splat(1.0);
        assert_eq!(
            sd.assign_conditional(here, &Preassigned::single("type", "w"), &mut rng)
                .unwrap(),
            Assignment::Unassigned(Unassigned::NoCompatibleTrait)
        );
        assert_eq!(
            sd.assign_conditional(here, &Preassigned::single("type", "z"), &mut rng)
                .unwrap(),
            Assignment::Unassigned(Unassigned::ZeroProbability)
        );
        assert_eq!(
            sd.assign_conditional(DVec3::splat(30.0), &Preassigned::new(), &mut rng)
                .unwrap(),
            Assignment::Unassigned(Unassigned::NoDistribution)
        );
    }

    #[test]
    fn test_unconstrained_draw_respects_mass() {
        let sd = xyz();
        for entity in 0..200 {
            let mut rng = entity_rng(3, entity);
            let a = sd
                .assign_conditional(DVec3::splat(1.0), &Preassigned::new(), &mut rng)
                .unwrap();
            assert!(matches!(a, Assignment::Trait(0) | Assignment::Trait(1)));
        }
    }

    #[test]
    fn test_unknown_attribute_is_error() {
        let sd = xyz();
        let mut rng = entity_rng(0, 0);
        assert_eq!(
            sd.assign_conditional(DVec3::ONE, &Preassigned::single("layer", 4i64), &mut rng),
            Err(TraitsError::UnknownAttribute("layer".into()))
        );
    }

    #[test]
    fn test_batch_follows_input_order() {
        let sd = xyz();
        let positions = vec![DVec3::ONE; 4];
        let preassigned = vec![
            Preassigned::single("type", "y"),
            Preassigned::single("type", "x"),
            Preassigned::single("type", "z"),
            Preassigned::single("name", "b").with("color", 0i64),
        ];
        let result = sd
            .assign_conditional_batch(&positions, &preassigned, &EntitySampler::new(1))
            .unwrap();
        assert_eq!(
            result.iter().map(|a| a.to_sentinel()).collect::<Vec<_>>(),
            vec![1, 0, -1, 1]
        );
    }

    #[test]
    fn test_batch_length_mismatch() {
        let sd = xyz();
        let result =
            sd.assign_conditional_batch(&[DVec3::ONE], &[], &EntitySampler::new(1));
        assert_eq!(
            result,
            Err(TraitsError::LengthMismatch {
                positions: 1,
                preassigned: 0
            })
        );
    }

    #[test]
    fn test_preassigned_replaces_duplicate_attribute() {
        let p: Preassigned = [("type", "x"), ("type", "y")].into_iter().collect();
        assert_eq!(p.len(), 1);
        assert_eq!(p.iter().next(), Some(("type", &AttributeValue::from("y"))));
    }

    #[test]
    fn test_summary_counts() {
        let summary = AssignmentSummary::from_assignments(&[
            Assignment::Trait(0),
            Assignment::Trait(3),
            Assignment::Unassigned(Unassigned::NoDistribution),
            Assignment::Unassigned(Unassigned::ZeroProbability),
        ]);
        assert_eq!(summary.assigned, 2);
        assert_eq!(summary.unassigned(), 2);
        assert_eq!(summary.no_compatible_trait, 0);
    }
}
