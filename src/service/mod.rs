use crate::{
    domain::{ApplicationId, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication},
    error::Result,
};
use async_trait::async_trait;

pub mod memory;

pub use memory::InMemoryService;

/// Remote job application service.
///
/// Every call may be retried, so implementations must be idempotent-safe,
/// and every call that takes a status must reject `Unspecified`.
#[async_trait]
pub trait ApplicationService: Send + Sync {
    /// Creates a job application and returns it with its server-assigned id
    async fn create(&self, input: NewApplication) -> Result<JobApplication>;

    /// Merges the present fields of `changes` into an application
    async fn update(&self, id: &ApplicationId, changes: ApplicationUpdate)
        -> Result<JobApplication>;

    /// Moves an application to a column slot
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        position: &str,
    ) -> Result<JobApplication>;

    /// Deletes an application
    async fn delete(&self, id: &ApplicationId) -> Result<()>;

    /// Lists all live applications; the source of truth for the client cache
    async fn list(&self) -> Result<Vec<JobApplication>>;
}
