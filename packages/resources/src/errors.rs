use crate::resource::MutationKind;
use thiserror::Error;

/// Failure reported by a resource backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Resource not found on server: {0}")]
    NotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimisticError {
    /// Another mutation on this id has not settled yet
    #[error("Resource {id} already has a mutation in flight")]
    Busy { id: String },

    #[error("Resource {id} is not in the list")]
    NotFound { id: String },

    /// The backend failed; the local change has been rolled back
    #[error("{kind} of {id} failed: {source}")]
    Rejected {
        kind: MutationKind,
        id: String,
        #[source]
        source: MutationError,
    },
}

impl OptimisticError {
    pub fn id(&self) -> &str {
        match self {
            OptimisticError::Busy { id }
            | OptimisticError::NotFound { id }
            | OptimisticError::Rejected { id, .. } => id,
        }
    }
}
