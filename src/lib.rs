pub mod errors;
pub mod flow_config;
pub mod init;
pub mod sequencer;
pub mod telemetry;
pub mod ui;
pub mod workflow;

pub use errors::{ConfigError, SequencerError};
pub use sequencer::{RunEvent, RunOutcome, RunState, Sequencer, StartOutcome};
pub use workflow::{ApprovalStatus, Participant, Scenario, Stage, WorkflowModel};
