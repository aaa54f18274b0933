//! Error types for the editor

use crate::document::InvariantViolation;
use crate::persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),
}
