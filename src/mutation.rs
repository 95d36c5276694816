use crate::cache::QueryCache;
use crate::domain::{
    ApplicationId, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication,
};
use crate::error::{KisekiError, Result};
use crate::service::ApplicationService;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The four remote mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    UpdateStatus,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::UpdateStatus => write!(f, "update status"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Optimistic mutations against the shared query cache.
///
/// Every mutation follows the same protocol:
///
/// 1. cancel in-flight refetches,
/// 2. snapshot the cached list,
/// 3. write the expected result into the cache,
/// 4. issue the remote call,
/// 5. on failure restore the snapshot and return `MutationRejected`,
/// 6. on settlement refetch the list so the server state wins.
///
/// Mutations are not serialized against each other. Interleaved writes can
/// briefly clobber each other until the last refetch lands.
pub struct OptimisticMutator<S: ?Sized> {
    service: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S: ?Sized> Clone for OptimisticMutator<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S> OptimisticMutator<S>
where
    S: ApplicationService + ?Sized,
{
    pub fn new(service: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { service, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Creates an application, showing it under a temporary id until the
    /// settlement refetch brings in the server copy.
    pub async fn create(&self, input: NewApplication) -> Result<JobApplication> {
        input.status.ensure_specified()?;

        let placeholder = JobApplication::new(ApplicationId::new(), input.clone());
        let service = Arc::clone(&self.service);

        self.run(
            MutationKind::Create,
            move |applications| applications.push(placeholder),
            async move { service.create(input).await },
        )
        .await
    }

    /// Merges `changes` into an application
    pub async fn update(
        &self,
        id: &ApplicationId,
        changes: ApplicationUpdate,
    ) -> Result<JobApplication> {
        if let Some(status) = changes.status {
            status.ensure_specified()?;
        }

        let speculative = changes.clone();
        let service = Arc::clone(&self.service);
        let target = id.clone();

        self.run(
            MutationKind::Update,
            |applications| {
                if let Some(app) = applications.iter_mut().find(|app| &app.id == id) {
                    app.apply_update(&speculative);
                }
            },
            async move { service.update(&target, changes).await },
        )
        .await
    }

    /// Moves an application to `status` at `position`
    pub async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        position: impl Into<String>,
    ) -> Result<JobApplication> {
        status.ensure_specified()?;

        let position = position.into();
        let speculative = position.clone();
        let service = Arc::clone(&self.service);
        let target = id.clone();

        self.run(
            MutationKind::UpdateStatus,
            |applications| {
                if let Some(app) = applications.iter_mut().find(|app| &app.id == id) {
                    app.move_to(status, speculative);
                }
            },
            async move { service.update_status(&target, status, &position).await },
        )
        .await
    }

    /// Deletes an application
    pub async fn delete(&self, id: &ApplicationId) -> Result<()> {
        let service = Arc::clone(&self.service);
        let target = id.clone();

        self.run(
            MutationKind::Delete,
            |applications| applications.retain(|app| &app.id != id),
            async move { service.delete(&target).await },
        )
        .await
    }

    /// Runs one mutation through the snapshot / apply / settle protocol.
    ///
    /// `remote` is not polled until the speculative write is in place.
    async fn run<T, F, Fut>(&self, kind: MutationKind, speculate: F, remote: Fut) -> Result<T>
    where
        F: FnOnce(&mut Vec<JobApplication>),
        Fut: Future<Output = Result<T>>,
    {
        self.cache.cancel_refetches();
        let snapshot = self.cache.speculate(speculate).await;
        debug!(%kind, "applied speculative write");

        let result = match remote.await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(%kind, error = %err, "mutation failed, rolling back");
                self.cache.restore(snapshot).await;
                Err(KisekiError::MutationRejected {
                    kind,
                    source: Box::new(err),
                })
            }
        };

        self.settle(kind).await;
        result
    }

    async fn settle(&self, kind: MutationKind) {
        match self.cache.refetch(self.service.as_ref()).await {
            Ok(outcome) => info!(%kind, ?outcome, "mutation settled"),
            // The next successful refetch reconciles the cache
            Err(err) => warn!(%kind, error = %err, "settlement refetch failed"),
        }
    }
}
