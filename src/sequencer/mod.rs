//! Scenario sequencer.
//!
//! One run at a time plays a scenario's script against the shared
//! `RunState`: wait a fixed delay, decide a stage, move on. Runs are tagged
//! with an epoch so `reset` cancels every pending continuation at once.

pub mod events;
pub mod runner;
pub mod script;
pub mod state;

pub use events::RunEvent;
pub use runner::{Sequencer, StartOutcome};
pub use script::{Pacing, StagePacing, Step, build_script};
pub use state::{RunOutcome, RunState, step_label};
