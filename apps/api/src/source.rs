//! Candidate data source — loads the form-submission export from disk.
//!
//! The pipeline never reads files itself; callers load candidates here and
//! hand the resulting `Vec<CandidateRecord>` to the runner. A missing or
//! malformed file is a [`DataSourceError`] surfaced before the pipeline
//! starts — the run never begins on bad input.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::candidate::CandidateRecord;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("candidate data file '{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("candidate data file '{path}' is not a valid JSON candidate list: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads and parses the candidate export at `path`.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateRecord>, DataSourceError> {
    let path_display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| DataSourceError::Io {
        path: path_display.clone(),
        source,
    })?;

    let candidates: Vec<CandidateRecord> =
        serde_json::from_str(&raw).map_err(|source| DataSourceError::Parse {
            path: path_display.clone(),
            source,
        })?;

    info!("loaded {} candidates from {}", candidates.len(), path_display);
    Ok(candidates)
}
