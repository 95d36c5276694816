use crate::cache::{QueryCache, RefetchOutcome};
use crate::domain::reorder::{plan_drop, position_at_end, DragGesture, ReorderPlan};
use crate::domain::sorting::project_board;
use crate::domain::{
    ApplicationId, ApplicationStatus, ApplicationUpdate, BoardConfig, Column, JobApplication,
    NewApplication,
};
use crate::error::{KisekiError, Result};
use crate::mutation::OptimisticMutator;
use crate::service::ApplicationService;
use std::sync::Arc;
use tracing::debug;

/// One column as it should be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub column: Column,
    pub applications: Vec<JobApplication>,
}

/// What a drop ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The card was moved; holds the server copy
    Moved(JobApplication),
    /// The card would land where it already is; nothing was sent
    Unchanged,
    /// The dragged card is no longer on the board; nothing was sent
    Ignored,
}

/// Kanban board controller.
///
/// Turns board interactions into optimistic mutations against one shared
/// cache, computing position keys on the way.
pub struct Kanban<S: ?Sized> {
    config: BoardConfig,
    mutator: OptimisticMutator<S>,
}

impl<S> Kanban<S>
where
    S: ApplicationService + ?Sized,
{
    pub fn new(service: Arc<S>, config: BoardConfig) -> Result<Self> {
        Self::with_cache(service, Arc::new(QueryCache::new()), config)
    }

    /// Builds a controller on top of an existing cache
    pub fn with_cache(service: Arc<S>, cache: Arc<QueryCache>, config: BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mutator: OptimisticMutator::new(service, cache),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        self.mutator.cache()
    }

    pub fn mutator(&self) -> &OptimisticMutator<S> {
        &self.mutator
    }

    /// Fetches the application list into the cache
    pub async fn load(&self) -> Result<RefetchOutcome> {
        self.cache().refetch(self.mutator.service().as_ref()).await
    }

    /// Every configured column with its cards in display order
    pub async fn columns(&self) -> Vec<ColumnView> {
        let applications = self.cache().applications().await;
        project_board(&applications, &self.config.columns)
            .into_iter()
            .map(|(column, cards)| ColumnView {
                column,
                applications: cards.into_iter().cloned().collect(),
            })
            .collect()
    }

    /// Adds an application at the end of its column
    pub async fn add_application(&self, mut input: NewApplication) -> Result<JobApplication> {
        let status = self.visible_status(input.status)?;
        let applications = self.cache().applications().await;
        input.position = position_at_end(&applications, status)?;
        self.mutator.create(input).await
    }

    /// Updates fields of an application.
    ///
    /// A status change without an explicit position places the card at the
    /// end of its new column.
    pub async fn edit_application(
        &self,
        id: &ApplicationId,
        mut changes: ApplicationUpdate,
    ) -> Result<JobApplication> {
        if let Some(status) = changes.status {
            self.visible_status(status)?;

            let applications = self.cache().applications().await;
            let current = applications.iter().find(|app| &app.id == id);
            let moves_column = current.map_or(true, |app| app.status != status);
            if moves_column && changes.position.is_none() {
                let others: Vec<JobApplication> =
                    applications.iter().filter(|app| &app.id != id).cloned().collect();
                changes.position = Some(position_at_end(&others, status)?);
            }
        }
        self.mutator.update(id, changes).await
    }

    /// Deletes an application
    pub async fn remove_application(&self, id: &ApplicationId) -> Result<()> {
        self.mutator.delete(id).await
    }

    /// Applies a drag-and-drop gesture.
    ///
    /// Gestures for cards that are no longer on the board are dropped
    /// silently. Planning errors abort before the cache is touched.
    pub async fn drop_card(&self, gesture: &DragGesture) -> Result<DropOutcome> {
        self.visible_status(gesture.target.status())?;

        let applications = self.cache().applications().await;
        let plan = match plan_drop(&applications, gesture) {
            Ok(plan) => plan,
            Err(KisekiError::UnknownCard(id)) => {
                debug!(card = %id, "ignoring drop of unknown card");
                return Ok(DropOutcome::Ignored);
            }
            Err(err) => return Err(err),
        };

        match plan {
            ReorderPlan::Unchanged => Ok(DropOutcome::Unchanged),
            ReorderPlan::Move {
                card_id,
                status,
                position,
                ..
            } => {
                let moved = self
                    .mutator
                    .update_status(&card_id, status, position)
                    .await?;
                Ok(DropOutcome::Moved(moved))
            }
        }
    }

    fn visible_status(&self, status: ApplicationStatus) -> Result<ApplicationStatus> {
        let status = status.ensure_specified()?;
        if !self.config.has_column(status) {
            return Err(KisekiError::InvalidStatus(format!(
                "{} has no column on this board",
                status.as_db_str()
            )));
        }
        Ok(status)
    }
}
