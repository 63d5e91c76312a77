//! Driver error type.

use std::path::PathBuf;

use cortex_traits::{RecipeError, TraitsError};

/// Everything that can stop a run.
///
/// A broken config file never reaches here; `main` logs it and falls back to
/// defaults.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The recipe could not be read or validated.
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// Reducing, sampling or synapse class parsing failed.
    #[error(transparent)]
    Traits(#[from] TraitsError),

    /// No `--positions` file was given.
    #[error("no positions file given (use --positions)")]
    MissingPositions,

    /// Failed to read the positions file.
    #[error("failed to read positions {path}: {source}")]
    ReadPositions {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The positions file is not a RON list of `(x, y, z)` tuples.
    #[error("failed to parse positions: {0}")]
    ParsePositions(#[source] ron::error::SpannedError),

    /// Assignments could not be rendered as RON.
    #[error("failed to serialize assignments: {0}")]
    Serialize(#[source] ron::Error),

    /// Writing the output file failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
