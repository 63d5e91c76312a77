//! Error types for malformed collections and caller mistakes.
//!
//! Expected sampling failures are not errors; see [`Unassigned`](crate::Unassigned).

use cortex_voxel::VoxelError;

/// Errors raised by collection construction, reduce/split, and sampling entry points.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TraitsError {
    /// The attribute name is not part of the traits schema.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The same attribute name appears twice in a schema.
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),

    /// Trait rows and probability rows disagree.
    #[error("traits table has {traits} rows but distributions have {distributions}")]
    ShapeMismatch {
        /// Rows in the traits table.
        traits: usize,
        /// Rows in the probability table.
        distributions: usize,
    },

    /// A table row does not have the expected number of entries.
    #[error("row {row} has {actual} entries, expected {expected}")]
    RowWidth {
        /// Zero-based row position.
        row: usize,
        /// Width of the table.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },

    /// Split was asked to group on no attributes.
    #[error("at least one attribute is required")]
    EmptyAttributes,

    /// A voxel field cell names a group the distributions do not have.
    #[error("field cell {cell} references group {group}, but there are only {groups} groups")]
    InvalidFieldGroup {
        /// Linear (x-fastest) index of the offending cell.
        cell: usize,
        /// Group index stored in the cell.
        group: u32,
        /// Number of distribution groups.
        groups: usize,
    },

    /// Batch inputs of different lengths.
    #[error("{positions} positions but {preassigned} preassigned entries")]
    LengthMismatch {
        /// Number of positions.
        positions: usize,
        /// Number of preassigned constraint sets.
        preassigned: usize,
    },

    /// A proportion outside `[0, 1]`.
    #[error("proportion must be within [0, 1], got {0}")]
    InvalidProportion(f64),

    /// A synapse class attribute value that is neither excitatory nor inhibitory.
    #[error("unknown synapse class: {0}")]
    UnknownSynapseClass(String),

    /// Invalid voxel geometry.
    #[error(transparent)]
    Voxel(#[from] VoxelError),
}
