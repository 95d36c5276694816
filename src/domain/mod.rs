pub mod application;
pub mod board;
pub mod position;
pub mod reorder;
pub mod sorting;

pub use application::{
    ApplicationId, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication,
};
pub use board::{BoardConfig, Column};
pub use position::{generate_key_between, generate_n_keys_between, FIRST_KEY};
pub use reorder::{DragGesture, DropTarget, Edge, Placement, ReorderPlan};
pub use sorting::{compare_position, project, project_board};
