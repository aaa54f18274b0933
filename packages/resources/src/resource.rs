//! Backend boundary for server-backed resources

use crate::errors::MutationError;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// A server-backed entity identified by `id`
pub trait Resource: Clone + fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// The same resource under a different id (phantoms, duplicates)
    fn with_id(&self, id: String) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    Create,
    Delete,
    Update,
    Duplicate,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Delete => "delete",
            MutationKind::Update => "update",
            MutationKind::Duplicate => "duplicate",
        };
        f.write_str(name)
    }
}

/// Request sent to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOp<R> {
    /// `draft` carries the phantom's temporary id
    Create { draft: R },
    Delete { id: String },
    Update { id: String, value: R },
    Duplicate { source_id: String, draft: R },
}

impl<R> ResourceOp<R> {
    pub fn kind(&self) -> MutationKind {
        match self {
            ResourceOp::Create { .. } => MutationKind::Create,
            ResourceOp::Delete { .. } => MutationKind::Delete,
            ResourceOp::Update { .. } => MutationKind::Update,
            ResourceOp::Duplicate { .. } => MutationKind::Duplicate,
        }
    }
}

/// Applies mutations on the server
///
/// Deletes may be retried, so implementations must treat a repeated delete
/// of the same id as success.
pub trait ResourceBackend<R: Resource> {
    fn mutate(&self, op: ResourceOp<R>) -> impl Future<Output = Result<R, MutationError>> + Send;
}
