//! Errors of the project cleanup flows

use super::attempts::EraseReport;
use crate::api::ApiError;
use crate::eraser::EraseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Failed to create scoped API key for project {project_id}")]
    MintKey {
        project_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to connect to project {project_id}")]
    Connect {
        project_id: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Erase(#[from] EraseError),

    #[error("Failed to delete project {project_id} ({} resources left undeleted)", report.failures.len())]
    DeleteProject {
        project_id: String,
        report: Box<EraseReport>,
        #[source]
        source: ApiError,
    },
}

impl CleanupError {
    /// Erase report of the attempt that preceded the error, when one ran
    pub fn report(&self) -> Option<&EraseReport> {
        match self {
            CleanupError::DeleteProject { report, .. } => Some(report),
            _ => None,
        }
    }
}
