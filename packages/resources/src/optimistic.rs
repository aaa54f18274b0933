//! # Optimistic List
//!
//! Local mirror of a server collection. Every mutation is applied to the
//! list immediately and then confirmed or rolled back once the backend
//! answers.
//!
//! ```text
//! begin_*  ──▶ local list updated, id marked in flight ──▶ Ticket
//!                                                           │
//! backend.mutate(ticket.op())                               │
//!                                                           ▼
//! settle(ticket, result) ──▶ Ok: confirm   Err: roll back, Rejected
//! ```
//!
//! Only one mutation per id may be in flight; a second one is refused with
//! [`OptimisticError::Busy`] instead of being queued.

use crate::errors::{MutationError, OptimisticError};
use crate::resource::{MutationKind, Resource, ResourceBackend, ResourceOp};
use campaign_common::{IdGenerator, ResourceSettings};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticConfig {
    pub temp_id_prefix: String,
}

impl Default for OptimisticConfig {
    fn default() -> Self {
        Self::from(&ResourceSettings::default())
    }
}

impl From<&ResourceSettings> for OptimisticConfig {
    fn from(settings: &ResourceSettings) -> Self {
        Self {
            temp_id_prefix: settings.temp_id_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryStatus {
    /// Phantom with a temporary id, not yet on the server
    Pending,
    Confirmed,
    /// Update or duplicate of this resource is in flight
    Mutating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<R> {
    pub resource: R,
    pub status: EntryStatus,
}

impl<R: Resource> Entry<R> {
    fn confirmed(resource: R) -> Self {
        Self {
            resource,
            status: EntryStatus::Confirmed,
        }
    }

    pub fn id(&self) -> &str {
        self.resource.id()
    }
}

/// What to undo if the backend refuses
#[derive(Debug, Clone)]
enum Rollback<R> {
    RemovePhantom { temp_id: String },
    Reinsert { resource: R, index: usize },
    Restore { previous: R },
    RemoveDuplicate { source_id: String, temp_id: String },
}

/// Handle for one in-flight mutation, consumed by [`OptimisticList::settle`]
#[derive(Debug)]
#[must_use = "an unsettled ticket keeps its id busy"]
pub struct Ticket<R> {
    op: ResourceOp<R>,
    rollback: Rollback<R>,
}

impl<R> Ticket<R> {
    /// Request to send to the backend
    pub fn op(&self) -> &ResourceOp<R> {
        &self.op
    }

    pub fn kind(&self) -> MutationKind {
        self.op.kind()
    }
}

impl<R: Resource> Ticket<R> {
    /// Local id the mutation is tracked under
    pub fn id(&self) -> &str {
        match &self.rollback {
            Rollback::RemovePhantom { temp_id } => temp_id,
            Rollback::Reinsert { resource, .. } => resource.id(),
            Rollback::Restore { previous } => previous.id(),
            Rollback::RemoveDuplicate { temp_id, .. } => temp_id,
        }
    }
}

/// Resource list with speculative local edits
#[derive(Debug)]
pub struct OptimisticList<R> {
    entries: Vec<Entry<R>>,
    in_flight: HashMap<String, MutationKind>,
    temp_ids: IdGenerator,
    config: OptimisticConfig,
}

impl<R: Resource> OptimisticList<R> {
    pub fn new(config: OptimisticConfig) -> Self {
        Self::with_resources(Vec::new(), config)
    }

    pub fn with_resources(resources: Vec<R>, config: OptimisticConfig) -> Self {
        Self {
            entries: resources.into_iter().map(Entry::confirmed).collect(),
            in_flight: HashMap::new(),
            temp_ids: IdGenerator::from_seed(config.temp_id_prefix.clone()),
            config,
        }
    }

    pub fn config(&self) -> &OptimisticConfig {
        &self.config
    }

    pub fn entries(&self) -> &[Entry<R>] {
        &self.entries
    }

    pub fn resources(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|e| &e.resource)
    }

    pub fn get(&self, id: &str) -> Option<&Entry<R>> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` has a mutation in flight (hosts disable its actions)
    pub fn is_mutating(&self, id: &str) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn in_flight(&self) -> impl Iterator<Item = (&str, MutationKind)> {
        self.in_flight.iter().map(|(id, kind)| (id.as_str(), *kind))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    fn claim(&mut self, id: &str, kind: MutationKind) -> Result<usize, OptimisticError> {
        if self.in_flight.contains_key(id) {
            debug!(id, %kind, "Refusing mutation, resource busy");
            return Err(OptimisticError::Busy { id: id.to_string() });
        }
        let index = self.index_of(id).ok_or_else(|| OptimisticError::NotFound {
            id: id.to_string(),
        })?;
        self.in_flight.insert(id.to_string(), kind);
        Ok(index)
    }

    fn fresh_temp_id(&mut self) -> String {
        loop {
            let id = self.temp_ids.new_id();
            if self.index_of(&id).is_none() && !self.in_flight.contains_key(&id) {
                return id;
            }
        }
    }

    /// Append a phantom built from `draft` under a temporary id
    pub fn begin_create(&mut self, draft: R) -> Ticket<R> {
        let temp_id = self.fresh_temp_id();
        let phantom = draft.with_id(temp_id.clone());

        self.entries.push(Entry {
            resource: phantom.clone(),
            status: EntryStatus::Pending,
        });
        self.in_flight.insert(temp_id.clone(), MutationKind::Create);
        debug!(temp_id = %temp_id, "Optimistic create");

        Ticket {
            op: ResourceOp::Create { draft: phantom },
            rollback: Rollback::RemovePhantom { temp_id },
        }
    }

    /// Remove `id` from the list right away
    pub fn begin_delete(&mut self, id: &str) -> Result<Ticket<R>, OptimisticError> {
        let index = self.claim(id, MutationKind::Delete)?;
        let removed = self.entries.remove(index);
        debug!(id, index, "Optimistic delete");

        Ok(Ticket {
            op: ResourceOp::Delete { id: id.to_string() },
            rollback: Rollback::Reinsert {
                resource: removed.resource,
                index,
            },
        })
    }

    /// Replace `id` with `value` locally, keeping the previous value
    pub fn begin_update(&mut self, id: &str, value: R) -> Result<Ticket<R>, OptimisticError> {
        let index = self.claim(id, MutationKind::Update)?;
        let value = value.with_id(id.to_string());
        let entry = &mut self.entries[index];
        let previous = std::mem::replace(&mut entry.resource, value.clone());
        entry.status = EntryStatus::Mutating;
        debug!(id, "Optimistic update");

        Ok(Ticket {
            op: ResourceOp::Update {
                id: id.to_string(),
                value,
            },
            rollback: Rollback::Restore { previous },
        })
    }

    /// Insert a phantom copy of `id` right after it
    pub fn begin_duplicate(&mut self, id: &str) -> Result<Ticket<R>, OptimisticError> {
        let index = self.claim(id, MutationKind::Duplicate)?;
        let temp_id = self.fresh_temp_id();
        let draft = self.entries[index].resource.with_id(temp_id.clone());

        self.entries[index].status = EntryStatus::Mutating;
        self.entries.insert(
            index + 1,
            Entry {
                resource: draft.clone(),
                status: EntryStatus::Pending,
            },
        );
        self.in_flight.insert(temp_id.clone(), MutationKind::Duplicate);
        debug!(id, temp_id = %temp_id, "Optimistic duplicate");

        Ok(Ticket {
            op: ResourceOp::Duplicate {
                source_id: id.to_string(),
                draft,
            },
            rollback: Rollback::RemoveDuplicate {
                source_id: id.to_string(),
                temp_id,
            },
        })
    }

    /// Confirm or roll back a mutation once the backend has answered
    ///
    /// On failure the list is restored and the backend error is returned as
    /// [`OptimisticError::Rejected`].
    pub fn settle(
        &mut self,
        ticket: Ticket<R>,
        result: Result<R, MutationError>,
    ) -> Result<R, OptimisticError> {
        let kind = ticket.kind();
        let id = ticket.id().to_string();

        match result {
            Ok(confirmed) => {
                self.confirm(ticket.rollback, &confirmed);
                debug!(id = %id, %kind, confirmed_id = confirmed.id(), "Mutation confirmed");
                Ok(confirmed)
            }
            Err(source) => {
                self.roll_back(ticket.rollback);
                warn!(id = %id, %kind, error = %source, "Mutation failed, rolled back");
                Err(OptimisticError::Rejected { kind, id, source })
            }
        }
    }

    fn confirm(&mut self, rollback: Rollback<R>, confirmed: &R) {
        match rollback {
            Rollback::RemovePhantom { temp_id } => {
                self.in_flight.remove(&temp_id);
                self.replace_phantom(&temp_id, confirmed);
            }
            Rollback::Reinsert { resource, .. } => {
                self.in_flight.remove(resource.id());
            }
            Rollback::Restore { previous } => {
                self.in_flight.remove(previous.id());
                if let Some(index) = self.index_of(previous.id()) {
                    self.entries[index] = Entry::confirmed(confirmed.clone());
                }
            }
            Rollback::RemoveDuplicate { source_id, temp_id } => {
                self.in_flight.remove(&source_id);
                self.in_flight.remove(&temp_id);
                self.set_confirmed(&source_id);
                self.replace_phantom(&temp_id, confirmed);
            }
        }
    }

    fn roll_back(&mut self, rollback: Rollback<R>) {
        match rollback {
            Rollback::RemovePhantom { temp_id } => {
                self.in_flight.remove(&temp_id);
                self.entries.retain(|e| e.id() != temp_id);
            }
            Rollback::Reinsert { resource, index } => {
                self.in_flight.remove(resource.id());
                let index = index.min(self.entries.len());
                self.entries.insert(index, Entry::confirmed(resource));
            }
            Rollback::Restore { previous } => {
                self.in_flight.remove(previous.id());
                if let Some(index) = self.index_of(previous.id()) {
                    self.entries[index] = Entry::confirmed(previous);
                }
            }
            Rollback::RemoveDuplicate { source_id, temp_id } => {
                self.in_flight.remove(&source_id);
                self.in_flight.remove(&temp_id);
                self.entries.retain(|e| e.id() != temp_id);
                self.set_confirmed(&source_id);
            }
        }
    }

    fn replace_phantom(&mut self, temp_id: &str, confirmed: &R) {
        // A refresh may already have brought the confirmed resource in
        if confirmed.id() != temp_id && self.index_of(confirmed.id()).is_some() {
            self.entries.retain(|e| e.id() != temp_id);
            return;
        }

        match self.index_of(temp_id) {
            Some(index) => self.entries[index] = Entry::confirmed(confirmed.clone()),
            None => self.entries.push(Entry::confirmed(confirmed.clone())),
        }
    }

    fn set_confirmed(&mut self, id: &str) {
        if let Some(index) = self.index_of(id) {
            self.entries[index].status = EntryStatus::Confirmed;
        }
    }

    /// Replace the list with a fresh server listing
    ///
    /// Phantoms are kept after the server entries, resources with a delete in
    /// flight stay hidden and resources with an update in flight keep their
    /// local value.
    pub fn reconcile(&mut self, server: Vec<R>) {
        let mut local: HashMap<String, Entry<R>> = self
            .entries
            .iter()
            .filter(|e| e.status == EntryStatus::Mutating)
            .map(|e| (e.id().to_string(), e.clone()))
            .collect();
        let phantoms: Vec<Entry<R>> = self
            .entries
            .iter()
            .filter(|e| e.status == EntryStatus::Pending)
            .cloned()
            .collect();

        let mut entries = Vec::with_capacity(server.len() + phantoms.len());
        for resource in server {
            match self.in_flight.get(resource.id()) {
                Some(MutationKind::Delete) => continue,
                Some(_) => match local.remove(resource.id()) {
                    Some(entry) => entries.push(entry),
                    None => entries.push(Entry::confirmed(resource)),
                },
                None => entries.push(Entry::confirmed(resource)),
            }
        }
        entries.extend(phantoms);

        debug!(entries = entries.len(), in_flight = self.in_flight.len(), "List reconciled");
        self.entries = entries;
    }

    /// Optimistic create against `backend`
    pub async fn create<B>(&mut self, backend: &B, draft: R) -> Result<R, OptimisticError>
    where
        B: ResourceBackend<R>,
    {
        let ticket = self.begin_create(draft);
        let result = backend.mutate(ticket.op().clone()).await;
        self.settle(ticket, result)
    }

    /// Optimistic delete against `backend`
    pub async fn delete<B>(&mut self, backend: &B, id: &str) -> Result<R, OptimisticError>
    where
        B: ResourceBackend<R>,
    {
        let ticket = self.begin_delete(id)?;
        let result = backend.mutate(ticket.op().clone()).await;
        self.settle(ticket, result)
    }

    /// Optimistic update against `backend`
    pub async fn update<B>(&mut self, backend: &B, id: &str, value: R) -> Result<R, OptimisticError>
    where
        B: ResourceBackend<R>,
    {
        let ticket = self.begin_update(id, value)?;
        let result = backend.mutate(ticket.op().clone()).await;
        self.settle(ticket, result)
    }

    /// Optimistic duplicate against `backend`
    pub async fn duplicate<B>(&mut self, backend: &B, id: &str) -> Result<R, OptimisticError>
    where
        B: ResourceBackend<R>,
    {
        let ticket = self.begin_duplicate(id)?;
        let result = backend.mutate(ticket.op().clone()).await;
        self.settle(ticket, result)
    }
}
