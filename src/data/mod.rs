//! Data layer — crop content, fertilizer coefficients and farm configuration.
//!
//! Everything here is read-only input to the farming core. Values come from
//! RON files owned by the content side; the core never hard-codes balancing
//! numbers. Loading validates eagerly so a bad data file fails at startup
//! instead of producing an impossible crop mid-season.

mod config;
mod crops;
mod fertilizer;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::*;

pub use config::FarmConfig;
pub use crops::{validate_definition, CropCatalog};
pub use fertilizer::FertilizerTable;

/// Failure while loading or validating content/config data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("crop '{id}': {reason}")]
    InvalidCrop { id: CropId, reason: String },

    #[error("duplicate crop id '{0}'")]
    DuplicateCrop(CropId),

    #[error("fertilizer {0:?}: growth multiplier must be a finite value of at least 1.0")]
    InvalidFertilizer(FertilizerType),

    #[error("farm config: {0}")]
    InvalidConfig(String),
}

pub(crate) fn read_data_file(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
