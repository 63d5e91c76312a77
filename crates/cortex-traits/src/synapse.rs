//! Excitatory/inhibitory synapse class assignment.

use std::fmt;

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeValue;
use crate::collection::SpatialDistribution;
use crate::error::TraitsError;
use crate::sampler::EntitySampler;

/// Attribute holding the synapse class in recipe trait tables.
pub const SYNAPSE_CLASS_ATTRIBUTE: &str = "sClass";

/// Synapse class of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynapseClass {
    /// Excitatory cell (`EXC`).
    Excitatory,
    /// Inhibitory cell (`INH`).
    Inhibitory,
}

impl SynapseClass {
    /// Abbreviation used in circuit exports.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Excitatory => "EXC",
            Self::Inhibitory => "INH",
        }
    }

    /// Lowercase attribute value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Excitatory => "excitatory",
            Self::Inhibitory => "inhibitory",
        }
    }

    /// Parses a recipe attribute value (full or short name, any case).
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::UnknownSynapseClass`] for anything else.
    pub fn from_value(value: &AttributeValue) -> Result<Self, TraitsError> {
        let text = value.as_str().unwrap_or_default();
        if text.eq_ignore_ascii_case("excitatory") || text.eq_ignore_ascii_case("exc") {
            Ok(Self::Excitatory)
        } else if text.eq_ignore_ascii_case("inhibitory") || text.eq_ignore_ascii_case("inh") {
            Ok(Self::Inhibitory)
        } else {
            Err(TraitsError::UnknownSynapseClass(value.to_string()))
        }
    }
}

impl fmt::Display for SynapseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flips one weighted coin per cell: inhibitory with probability
/// `inhibitory_proportion`, excitatory otherwise.
///
/// # Errors
///
/// Returns [`TraitsError::InvalidProportion`] unless the proportion is in `[0, 1]`.
pub fn assign_synapse_class_randomly<R: Rng + ?Sized>(
    count: usize,
    inhibitory_proportion: f64,
    rng: &mut R,
) -> Result<Vec<SynapseClass>, TraitsError> {
    if !(0.0..=1.0).contains(&inhibitory_proportion) {
        return Err(TraitsError::InvalidProportion(inhibitory_proportion));
    }
    Ok((0..count)
        .map(|_| {
            if rng.random_bool(inhibitory_proportion) {
                SynapseClass::Inhibitory
            } else {
                SynapseClass::Excitatory
            }
        })
        .collect())
}

/// Samples the `sClass` attribute of `collection` at every position.
///
/// Entities that cannot be assigned (no group, zero mass) yield `None`.
///
/// # Errors
///
/// Returns [`TraitsError::UnknownAttribute`] if the recipe has no `sClass`
/// column and [`TraitsError::UnknownSynapseClass`] for unrecognized values.
pub fn assign_synapse_class_from_recipe(
    positions: &[DVec3],
    collection: &SpatialDistribution,
    sampler: &EntitySampler,
) -> Result<Vec<Option<SynapseClass>>, TraitsError> {
    let values = collection.assign_attribute(positions, SYNAPSE_CLASS_ATTRIBUTE, sampler)?;
    parse_synapse_classes(&values)
}

/// Parses sampled `sClass` values, keeping `None` for unassigned entities.
///
/// # Errors
///
/// Returns [`TraitsError::UnknownSynapseClass`] for the first unrecognized value.
pub fn parse_synapse_classes(
    values: &[Option<AttributeValue>],
) -> Result<Vec<Option<SynapseClass>>, TraitsError> {
    values
        .iter()
        .map(|value| value.as_ref().map(SynapseClass::from_value).transpose())
        .collect()
}
