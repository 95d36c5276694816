//! # Kiseki Core
//!
//! Ordering and optimistic-mutation core for a kanban job-application
//! tracker.
//!
//! Cards live in status columns and are ordered inside a column by
//! fractional position keys, so moving a card rewrites only that card.
//! Board edits are applied to a shared client-side cache first, sent to the
//! application service, and rolled back if the service rejects them. The
//! service's list stays the source of truth: every mutation ends with a
//! refetch.

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod kanban;
pub mod mutation;
pub mod service;

// Re-export commonly used types
pub use cache::{QueryCache, RefetchOutcome};
pub use config::ConfigStore;
pub use domain::{
    application::{
        ApplicationId, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication,
    },
    board::{BoardConfig, Column},
    reorder::{DragGesture, DropTarget, Edge, ReorderPlan},
};
pub use error::{KisekiError, Result};
pub use kanban::{ColumnView, DropOutcome, Kanban};
pub use mutation::{MutationKind, OptimisticMutator};
pub use service::{ApplicationService, InMemoryService};
