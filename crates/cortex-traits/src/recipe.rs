//! Recipe loading: a RON description of traits, per-group probabilities, and
//! the voxel field mapping space onto groups.
//!
//! ```ron
//! (
//!     voxel_dimensions: (25.0, 25.0, 25.0),
//!     offset: (0.0, 0.0, 0.0),
//!     field: Some((shape: (2, 1, 1), cells: [0, 1])),
//!     attributes: ["mtype", "sClass"],
//!     traits: [["L23_PC", "excitatory"], ["L23_MC", "inhibitory"]],
//!     // one entry per group, one probability per trait
//!     distributions: [[8.0, 2.0], [1.0, 1.0]],
//! )
//! ```
//!
//! Probabilities may be unnormalized; every group column is normalized on load.

use std::path::{Path, PathBuf};

use cortex_voxel::{VoxelError, VoxelField};
use glam::{DVec3, UVec3};
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeValue;
use crate::collection::SpatialDistribution;
use crate::error::TraitsError;
use crate::probability::{ProbabilityTable, normalize_distribution_collection};
use crate::traits_table::TraitTable;

/// Errors that can occur when reading or validating a recipe.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// Failed to read the recipe file from disk.
    #[error("failed to read recipe {path}: {source}")]
    ReadError {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON content.
    #[error("failed to parse recipe: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// A group column lists the wrong number of probabilities.
    #[error("group {group} has {actual} probabilities, expected one per trait ({expected})")]
    GroupLength {
        /// Group (column) index.
        group: usize,
        /// Number of traits.
        expected: usize,
        /// Entries in the column.
        actual: usize,
    },

    /// Probabilities must be finite and non-negative.
    #[error("group {group}, trait {trait_index}: invalid probability {value}")]
    InvalidProbability {
        /// Group (column) index.
        group: usize,
        /// Trait (row) index.
        trait_index: usize,
        /// Offending value.
        value: f64,
    },

    /// Malformed traits table or inconsistent tables.
    #[error(transparent)]
    Traits(#[from] TraitsError),

    /// Malformed voxel field.
    #[error(transparent)]
    Voxel(#[from] VoxelError),
}

/// Source of raw distribution collections.
pub trait RecipeLoader {
    /// Loads, validates and normalizes a collection.
    fn load(&self) -> Result<SpatialDistribution, RecipeError>;
}

/// Voxel field section of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDocument {
    /// Voxels along x, y, z.
    pub shape: (u32, u32, u32),
    /// Group index per voxel, x-fastest. `4294967295` (`u32::MAX`) means
    /// "no distribution"; any other value must name a group.
    pub cells: Vec<u32>,
}

/// On-disk recipe layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDocument {
    /// Physical size of one voxel.
    pub voxel_dimensions: (f64, f64, f64),
    /// World-space position of the field origin.
    #[serde(default)]
    pub offset: (f64, f64, f64),
    /// Voxel to group mapping; absent for table-only recipes.
    #[serde(default)]
    pub field: Option<FieldDocument>,
    /// Attribute names, in column order of `traits`.
    pub attributes: Vec<String>,
    /// One row of attribute values per trait.
    pub traits: Vec<Vec<AttributeValue>>,
    /// One column per group, one (unnormalized) probability per trait.
    pub distributions: Vec<Vec<f64>>,
}

impl RecipeDocument {
    /// Parses a recipe from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, RecipeError> {
        ron::from_str(contents).map_err(RecipeError::ParseError)
    }

    /// Validates the document and builds a normalized collection.
    pub fn into_collection(self) -> Result<SpatialDistribution, RecipeError> {
        let trait_count = self.traits.len();
        for (group, column) in self.distributions.iter().enumerate() {
            if column.len() != trait_count {
                return Err(RecipeError::GroupLength {
                    group,
                    expected: trait_count,
                    actual: column.len(),
                });
            }
            if let Some((trait_index, &value)) = column
                .iter()
                .enumerate()
                .find(|(_, p)| !p.is_finite() || **p < 0.0)
            {
                return Err(RecipeError::InvalidProbability {
                    group,
                    trait_index,
                    value,
                });
            }
        }

        let raw = ProbabilityTable::from_columns(trait_count, self.distributions)?;
        let distributions = normalize_distribution_collection(raw);
        let traits = TraitTable::from_rows(self.attributes, self.traits)?;
        let field = self
            .field
            .map(|f| {
                let (x, y, z) = f.shape;
                let (ox, oy, oz) = self.offset;
                VoxelField::new(UVec3::new(x, y, z), DVec3::new(ox, oy, oz), f.cells)
            })
            .transpose()?;
        let (dx, dy, dz) = self.voxel_dimensions;

        Ok(SpatialDistribution::new(
            field,
            distributions,
            traits,
            DVec3::new(dx, dy, dz),
        )?)
    }
}

/// Loads a [`RecipeDocument`] from a RON file.
#[derive(Debug, Clone)]
pub struct RonRecipe {
    path: PathBuf,
}

impl RonRecipe {
    /// Creates a loader for the given file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The recipe file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecipeLoader for RonRecipe {
    fn load(&self) -> Result<SpatialDistribution, RecipeError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| RecipeError::ReadError {
                path: self.path.clone(),
                source,
            })?;
        let collection = RecipeDocument::from_ron_str(&contents)?.into_collection()?;
        tracing::info!(
            "Loaded recipe {} ({} traits, {} groups)",
            self.path.display(),
            collection.traits().len(),
            collection.distributions().num_columns()
        );
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    const RECIPE: &str = r#"
        // two groups over three traits
        (
            voxel_dimensions: (10.0, 10.0, 10.0),
            field: Some((shape: (3, 1, 1), cells: [0, 1, 4294967295])),
            attributes: ["mtype", "layer"],
            traits: [["L23_PC", 2], ["L23_MC", 2], ["L4_SS", 4]],
            distributions: [[8.0, 2.0, 0.0], [0.0, 0.0, 0.0]],
        )
    "#;

    #[test]
    fn test_parse_and_normalize() {
        let sd = RecipeDocument::from_ron_str(RECIPE)
            .unwrap()
            .into_collection()
            .unwrap();
        assert_eq!(sd.traits().len(), 3);
        assert_eq!(sd.traits().get(2, "layer").unwrap(), &AttributeValue::Int(4));
        assert!((sd.distributions().get(0, 0) - 0.8).abs() < 1e-12);
        assert!((sd.distributions().get(1, 0) - 0.2).abs() < 1e-12);
        assert_eq!(sd.distributions().column_sum(1), 0.0);
        assert_eq!(sd.group_at(IVec3::new(0, 0, 0)), Some(0));
        assert_eq!(sd.group_at(IVec3::new(2, 0, 0)), None);
    }

    #[test]
    fn test_group_length_mismatch() {
        let doc = RecipeDocument {
            voxel_dimensions: (1.0, 1.0, 1.0),
            offset: (0.0, 0.0, 0.0),
            field: None,
            attributes: vec!["mtype".into()],
            traits: vec![vec!["a".into()], vec!["b".into()]],
            distributions: vec![vec![1.0]],
        };
        assert!(matches!(
            doc.into_collection(),
            Err(RecipeError::GroupLength {
                group: 0,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_negative_probability_rejected() {
        let doc = RecipeDocument {
            voxel_dimensions: (1.0, 1.0, 1.0),
            offset: (0.0, 0.0, 0.0),
            field: None,
            attributes: vec!["mtype".into()],
            traits: vec![vec!["a".into()], vec!["b".into()]],
            distributions: vec![vec![0.5, -0.5]],
        };
        assert!(matches!(
            doc.into_collection(),
            Err(RecipeError::InvalidProbability {
                group: 0,
                trait_index: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_field_shape_mismatch() {
        let doc = RecipeDocument {
            voxel_dimensions: (1.0, 1.0, 1.0),
            offset: (0.0, 0.0, 0.0),
            field: Some(FieldDocument {
                shape: (2, 2, 1),
                cells: vec![0, 0, 0],
            }),
            attributes: vec!["mtype".into()],
            traits: vec![vec!["a".into()]],
            distributions: vec![vec![1.0]],
        };
        assert!(matches!(
            doc.into_collection(),
            Err(RecipeError::Voxel(VoxelError::CellCountMismatch { .. }))
        ));
    }

    #[test]
    fn test_field_group_out_of_range() {
        let doc = RecipeDocument {
            voxel_dimensions: (1.0, 1.0, 1.0),
            offset: (0.0, 0.0, 0.0),
            field: Some(FieldDocument {
                shape: (2, 1, 1),
                cells: vec![0, 7],
            }),
            attributes: vec!["mtype".into()],
            traits: vec![vec!["a".into()], vec!["b".into()]],
            distributions: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        assert!(matches!(
            doc.into_collection(),
            Err(RecipeError::Traits(TraitsError::InvalidFieldGroup {
                cell: 1,
                group: 7,
                groups: 2
            }))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.ron");
        std::fs::write(&path, RECIPE).unwrap();
        let sd = RonRecipe::new(&path).load().unwrap();
        assert_eq!(sd.distributions().num_columns(), 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RonRecipe::new(dir.path().join("absent.ron")).load();
        assert!(matches!(result, Err(RecipeError::ReadError { .. })));
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        assert!(matches!(
            RecipeDocument::from_ron_str("(voxel_dimensions: oops)"),
            Err(RecipeError::ParseError(_))
        ));
    }
}
