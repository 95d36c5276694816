use crate::domain::JobApplication;
use crate::error::Result;
use crate::service::ApplicationService;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Copy of the cached collection taken right before a speculative write.
///
/// Restoring puts back exactly what was there, including "nothing loaded".
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a snapshot must be restored or dropped on settlement"]
pub struct MutationSnapshot(Option<Vec<JobApplication>>);

impl MutationSnapshot {
    pub fn applications(&self) -> Option<&[JobApplication]> {
        self.0.as_deref()
    }
}

/// Result of a refetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchOutcome {
    /// The server list replaced the cached collection
    Applied,
    /// A cancellation or newer refetch arrived first; the response was dropped
    Superseded,
}

/// Client-side cache of the job application list.
///
/// Holds whatever the last successful list call returned, plus speculative
/// writes from in-flight mutations. Refetches are tagged with a generation
/// number so a cancelled or superseded refetch never overwrites newer local
/// state.
#[derive(Debug, Default)]
pub struct QueryCache {
    data: RwLock<Option<Vec<JobApplication>>>,
    generation: AtomicU64,
}

impl QueryCache {
    /// Creates an empty, not yet loaded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache already holding `applications`
    pub fn with_data(applications: Vec<JobApplication>) -> Self {
        Self {
            data: RwLock::new(Some(applications)),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the cached collection
    pub async fn data(&self) -> Option<Vec<JobApplication>> {
        self.data.read().await.clone()
    }

    /// Cached collection, or an empty list when nothing is loaded yet
    pub async fn applications(&self) -> Vec<JobApplication> {
        self.data().await.unwrap_or_default()
    }

    pub async fn is_loaded(&self) -> bool {
        self.data.read().await.is_some()
    }

    pub async fn set_data(&self, applications: Option<Vec<JobApplication>>) {
        *self.data.write().await = applications;
    }

    /// Makes every refetch currently in flight discard its response
    pub fn cancel_refetches(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Snapshots the collection and applies `apply` to it under one lock.
    ///
    /// When nothing is cached yet `apply` is not called.
    pub async fn speculate<F>(&self, apply: F) -> MutationSnapshot
    where
        F: FnOnce(&mut Vec<JobApplication>),
    {
        let mut guard = self.data.write().await;
        let snapshot = MutationSnapshot(guard.clone());
        match guard.as_mut() {
            Some(applications) => apply(applications),
            None => debug!("cache empty, skipping speculative write"),
        }
        snapshot
    }

    /// Puts the collection back exactly as it was when `snapshot` was taken
    pub async fn restore(&self, snapshot: MutationSnapshot) {
        *self.data.write().await = snapshot.0;
    }

    /// Reloads the collection from `service`.
    ///
    /// Starting a refetch supersedes any refetch already in flight. The
    /// response is only written if no cancellation or newer refetch happened
    /// while it was pending.
    pub async fn refetch<S>(&self, service: &S) -> Result<RefetchOutcome>
    where
        S: ApplicationService + ?Sized,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let applications = match service.list().await {
            Ok(applications) => applications,
            Err(err) => {
                warn!(error = %err, "refetch failed");
                return Err(err);
            }
        };

        let mut guard = self.data.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "refetch superseded, dropping response");
            return Ok(RefetchOutcome::Superseded);
        }
        *guard = Some(applications);
        Ok(RefetchOutcome::Applied)
    }
}
