//! # Campaign Resources
//!
//! Optimistic mutation of server-backed collections (sites, campaigns).
//!
//! The list is updated before the backend answers so screens never wait on
//! the network; a failed request rolls the local change back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campaign_resources::{OptimisticConfig, OptimisticList};
//!
//! let mut sites = OptimisticList::with_resources(fetched, OptimisticConfig::default());
//!
//! // Phantom appears immediately, replaced by the server copy on success
//! let site = sites.create(&backend, Site::draft("Spring launch")).await?;
//!
//! // Removed immediately, reinserted at its old position on failure
//! sites.delete(&backend, &site.id).await?;
//! ```

mod errors;
mod optimistic;
mod resource;

pub use errors::{MutationError, OptimisticError};
pub use optimistic::{Entry, EntryStatus, OptimisticConfig, OptimisticList, Ticket};
pub use resource::{MutationKind, Resource, ResourceBackend, ResourceOp};
