//! # Persistence Boundary
//!
//! The editor never saves on its own. Hosts call
//! [`EditorSession::save`](crate::EditorSession::save) on an explicit save
//! action or an autosave tick, passing whatever implements [`Persist`].

use crate::document::Document;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Saves a document and returns the stored version
pub trait Persist {
    fn persist(&self, document: &Document) -> impl Future<Output = Result<Document, PersistError>> + Send;
}

/// Stores documents as pretty-printed JSON files
#[derive(Debug, Clone)]
pub struct JsonFilePersist {
    path: PathBuf,
}

impl JsonFilePersist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Persist for JsonFilePersist {
    async fn persist(&self, document: &Document) -> Result<Document, PersistError> {
        let json = document
            .to_json()
            .map_err(|e| PersistError::Storage(e.to_string()))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PersistError::Storage(format!("{}: {}", self.path.display(), e)))?;

        Ok(document.clone())
    }
}
