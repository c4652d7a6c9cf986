//! Workflow model: the fixed stage pipeline and its scripted scenarios.
//!
//! This module provides:
//! - `Stage`, `Participant` and `ApprovalStatus`
//! - `Scenario` with a tagged `Outcome`
//! - `WorkflowDefinition` (raw TOML tables) and `WorkflowModel` (validated)
//! - `Vote` and the stage-level vote reducer

pub mod model;
pub mod scenario;
pub mod stage;
pub mod votes;

pub use model::{
    DEFAULT_SCENARIO_ID, REQUIRED_STAGE_COUNT, RejectionPoint, WorkflowDefinition, WorkflowModel,
};
pub use scenario::{Outcome, Scenario};
pub use stage::{ApprovalStatus, Participant, Stage};
pub use votes::{Vote, reduce_votes};
