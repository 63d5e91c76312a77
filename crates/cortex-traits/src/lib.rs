//! Spatial trait assignment: probability tables over categorical traits,
//! marginalization and partitioning of distribution collections, and seeded
//! per-entity weighted sampling constrained by pre-assigned attributes.

mod attribute;
mod collection;
mod conditional;
mod error;
mod probability;
mod reduce;
mod sampler;
mod split;
mod traits_table;

pub mod recipe;
pub mod synapse;

pub use attribute::{AttributeValue, TraitKey};
pub use collection::{NO_DISTRIBUTION, SpatialDistribution};
pub use conditional::{
    Assignment, AssignmentSummary, Preassigned, UNASSIGNED_SENTINEL, Unassigned,
};
pub use error::TraitsError;
pub use probability::{ProbabilityTable, normalize_distribution_collection};
pub use recipe::{RecipeDocument, RecipeError, RecipeLoader, RonRecipe};
pub use sampler::{
    EntitySampler, assign_from_spatial_distribution, derive_entity_seed, entity_rng,
    weighted_choice,
};
pub use split::{SplitCollection, SplitEntry};
pub use synapse::{
    SYNAPSE_CLASS_ATTRIBUTE, SynapseClass, assign_synapse_class_from_recipe,
    assign_synapse_class_randomly, parse_synapse_classes,
};
pub use traits_table::TraitTable;
