//! Optimistic list against fake backends

use campaign_resources::{
    EntryStatus, MutationError, MutationKind, OptimisticConfig, OptimisticError, OptimisticList,
    Resource, ResourceBackend, ResourceOp,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Campaign {
    id: String,
    name: String,
}

impl Campaign {
    fn draft(name: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
        }
    }

    fn stored(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Resource for Campaign {
    fn id(&self) -> &str {
        &self.id
    }

    fn with_id(&self, id: String) -> Self {
        Self {
            id,
            name: self.name.clone(),
        }
    }
}

/// Assigns `c<n>` ids and records every request
#[derive(Default)]
struct FakeBackend {
    next_id: AtomicU64,
    fail_with: Option<MutationError>,
    latency: Option<Duration>,
    requests: Mutex<Vec<MutationKind>>,
}

impl FakeBackend {
    fn failing(error: MutationError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    fn slow(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<MutationKind> {
        self.requests.lock().unwrap().clone()
    }
}

impl ResourceBackend<Campaign> for FakeBackend {
    async fn mutate(&self, op: ResourceOp<Campaign>) -> Result<Campaign, MutationError> {
        self.requests.lock().unwrap().push(op.kind());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        Ok(match op {
            ResourceOp::Create { draft } | ResourceOp::Duplicate { draft, .. } => {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
                draft.with_id(format!("c{n}"))
            }
            ResourceOp::Delete { id } => Campaign::stored(&id, ""),
            ResourceOp::Update { value, .. } => value,
        })
    }
}

fn campaigns() -> OptimisticList<Campaign> {
    OptimisticList::with_resources(
        vec![
            Campaign::stored("c1", "Spring"),
            Campaign::stored("c2", "Summer"),
        ],
        OptimisticConfig::default(),
    )
}

fn ids(list: &OptimisticList<Campaign>) -> Vec<String> {
    list.resources().map(|c| c.id.clone()).collect()
}

#[tokio::test]
async fn test_create_confirms_phantom() -> anyhow::Result<()> {
    let backend = FakeBackend::default();
    let mut list = campaigns();

    let created = list.create(&backend, Campaign::draft("Autumn")).await?;

    assert_eq!(created, Campaign::stored("c100", "Autumn"));
    assert_eq!(ids(&list), ["c1", "c2", "c100"]);
    assert!(list
        .entries()
        .iter()
        .all(|e| e.status == EntryStatus::Confirmed));
    assert_eq!(backend.requests(), [MutationKind::Create]);
    Ok(())
}

#[tokio::test]
async fn test_failed_create_equals_pre_mutation_list() {
    let backend = FakeBackend::failing(MutationError::Rejected("quota exceeded".to_string()));
    let mut list = campaigns();
    let before = list.entries().to_vec();

    let err = list
        .create(&backend, Campaign::draft("Autumn"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OptimisticError::Rejected {
            kind: MutationKind::Create,
            source: MutationError::Rejected(_),
            ..
        }
    ));
    assert_eq!(list.entries(), before.as_slice());
}

#[tokio::test]
async fn test_failed_delete_reinserts() {
    let backend = FakeBackend::failing(MutationError::Network("timeout".to_string()));
    let mut list = campaigns();

    let err = list.delete(&backend, "c1").await.unwrap_err();

    assert_eq!(err.id(), "c1");
    assert_eq!(ids(&list), ["c1", "c2"]);
    assert!(!list.is_mutating("c1"));
}

#[tokio::test]
async fn test_delete_stays_removed() -> anyhow::Result<()> {
    let backend = FakeBackend::default();
    let mut list = campaigns();

    list.delete(&backend, "c2").await?;
    assert_eq!(ids(&list), ["c1"]);

    // Already gone locally, the backend is not asked again
    let err = list.delete(&backend, "c2").await.unwrap_err();
    assert_eq!(err, OptimisticError::NotFound { id: "c2".to_string() });
    assert_eq!(backend.requests(), [MutationKind::Delete]);
    Ok(())
}

#[tokio::test]
async fn test_update_and_duplicate() -> anyhow::Result<()> {
    let backend = FakeBackend::default();
    let mut list = campaigns();

    list.update(&backend, "c1", Campaign::draft("Spring sale"))
        .await?;
    let copy = list.duplicate(&backend, "c1").await?;

    assert_eq!(copy.name, "Spring sale");
    assert_eq!(ids(&list), ["c1", "c100", "c2"]);
    assert_eq!(
        backend.requests(),
        [MutationKind::Update, MutationKind::Duplicate]
    );
    Ok(())
}

#[tokio::test]
async fn test_list_is_observable_while_request_is_in_flight() -> anyhow::Result<()> {
    let backend = Arc::new(FakeBackend::slow(Duration::from_millis(20)));
    let mut list = campaigns();

    let ticket = list.begin_create(Campaign::draft("Winter"));
    let temp_id = ticket.id().to_string();
    let request = {
        let backend = Arc::clone(&backend);
        let op = ticket.op().clone();
        tokio::spawn(async move { backend.mutate(op).await })
    };

    // The phantom is visible and locked until the backend answers
    assert_eq!(ids(&list), ["c1", "c2", temp_id.as_str()]);
    assert_eq!(list.get(&temp_id).map(|e| e.status), Some(EntryStatus::Pending));
    assert!(matches!(
        list.begin_delete(&temp_id),
        Err(OptimisticError::Busy { .. })
    ));

    // Other resources remain editable
    let other = list.begin_delete("c1")?;
    list.settle(other, Ok(Campaign::stored("c1", "Spring")))?;

    let confirmed = list.settle(ticket, request.await?)?;
    assert_eq!(ids(&list), ["c2", confirmed.id.as_str()]);
    Ok(())
}
