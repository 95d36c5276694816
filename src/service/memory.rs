use crate::{
    domain::{ApplicationId, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication},
    error::{KisekiError, Result},
    service::ApplicationService,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::RwLock;
use tracing::debug;

/// In-process application service.
///
/// Validates input the same way the hosted service does and soft-deletes
/// cards. It can be switched offline to make every call fail, and given a
/// fixed latency to widen race windows.
#[derive(Debug, Default)]
pub struct InMemoryService {
    applications: RwLock<HashMap<ApplicationId, JobApplication>>,
    offline: AtomicBool,
    latency: Option<Duration>,
    mutations: AtomicUsize,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every subsequent call fail with `ServiceUnavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Inserts applications as-is, bypassing validation
    pub async fn seed(&self, applications: impl IntoIterator<Item = JobApplication>) {
        let mut store = self.applications.write().await;
        for application in applications {
            store.insert(application.id.clone(), application);
        }
    }

    /// Fetches one application, deleted ones included
    pub async fn get(&self, id: &ApplicationId) -> Option<JobApplication> {
        self.applications.read().await.get(id).cloned()
    }

    /// Number of mutation calls received, failed ones included
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    async fn round_trip(&self, mutation: bool) -> Result<()> {
        if mutation {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(KisekiError::ServiceUnavailable(
                "service is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationService for InMemoryService {
    async fn create(&self, input: NewApplication) -> Result<JobApplication> {
        self.round_trip(true).await?;
        input.status.ensure_specified()?;

        let application = JobApplication::new(ApplicationId::new(), input);
        debug!(id = %application.id, "created application");

        self.applications
            .write()
            .await
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    async fn update(
        &self,
        id: &ApplicationId,
        changes: ApplicationUpdate,
    ) -> Result<JobApplication> {
        self.round_trip(true).await?;
        if let Some(status) = changes.status {
            status.ensure_specified()?;
        }

        let mut store = self.applications.write().await;
        let application = store
            .get_mut(id)
            .filter(|app| !app.is_deleted())
            .ok_or_else(|| KisekiError::ApplicationNotFound(id.to_string()))?;

        application.apply_update(&changes);
        Ok(application.clone())
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        position: &str,
    ) -> Result<JobApplication> {
        self.round_trip(true).await?;
        status.ensure_specified()?;

        let mut store = self.applications.write().await;
        let application = store
            .get_mut(id)
            .filter(|app| !app.is_deleted())
            .ok_or_else(|| KisekiError::ApplicationNotFound(id.to_string()))?;

        application.move_to(status, position);
        Ok(application.clone())
    }

    async fn delete(&self, id: &ApplicationId) -> Result<()> {
        self.round_trip(true).await?;

        let mut store = self.applications.write().await;
        let application = store
            .get_mut(id)
            .ok_or_else(|| KisekiError::ApplicationNotFound(id.to_string()))?;

        // Repeating a delete is a no-op
        if !application.is_deleted() {
            application.mark_deleted();
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<JobApplication>> {
        self.round_trip(false).await?;

        let mut applications: Vec<JobApplication> = self
            .applications
            .read()
            .await
            .values()
            .filter(|app| !app.is_deleted())
            .cloned()
            .collect();

        applications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(applications)
    }
}
