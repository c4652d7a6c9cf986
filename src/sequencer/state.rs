//! Observable run state.

use serde::{Deserialize, Serialize};

use crate::workflow::{ApprovalStatus, Vote, WorkflowModel};

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage approved
    Approved,
    /// The run stopped at this stage
    Rejected { stage_index: usize },
}

/// Snapshot of the one active (or last) run.
///
/// The sequencer is the only writer; renderers read snapshots through
/// `Sequencer::snapshot` or a `watch` subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// One status per stage, in stage order
    pub stage_statuses: Vec<ApprovalStatus>,
    pub current_stage_index: usize,
    pub is_running: bool,
    /// Scenario driving the current or next run
    pub selected_scenario_id: String,
    /// Per stage, one optional vote per roster participant
    pub votes: Vec<Vec<Option<Vote>>>,
    /// Run epoch. Advanced when a run starts and when an active run is
    /// reset; continuations from an older epoch never apply.
    pub generation: u64,
}

impl RunState {
    /// Fresh state for a model, with `scenario_id` selected.
    pub fn initial(model: &WorkflowModel, scenario_id: &str) -> Self {
        Self {
            stage_statuses: model.initial_statuses(),
            current_stage_index: 0,
            is_running: false,
            selected_scenario_id: scenario_id.to_string(),
            votes: model.empty_votes(),
            generation: 0,
        }
    }

    /// Restore statuses, votes and the stage cursor, keeping the epoch.
    pub(crate) fn restore(&mut self, model: &WorkflowModel) {
        self.stage_statuses = model.initial_statuses();
        self.votes = model.empty_votes();
        self.current_stage_index = 0;
    }

    /// Outcome once the run has stopped on a decision.
    pub fn outcome(&self) -> Option<RunOutcome> {
        if self.is_running {
            return None;
        }
        if let Some(stage_index) = self
            .stage_statuses
            .iter()
            .position(|s| *s == ApprovalStatus::Rejected)
        {
            return Some(RunOutcome::Rejected { stage_index });
        }
        if !self.stage_statuses.is_empty()
            && self
                .stage_statuses
                .iter()
                .all(|s| *s == ApprovalStatus::Approved)
        {
            return Some(RunOutcome::Approved);
        }
        None
    }

    /// Number of stages that have been decided.
    pub fn resolved_count(&self) -> usize {
        self.stage_statuses.iter().filter(|s| s.is_resolved()).count()
    }

    /// Progress label for the current stage, e.g. "Step 2 of 4".
    pub fn step_label(&self) -> String {
        step_label(self.current_stage_index, self.stage_statuses.len())
    }
}

/// Progress label for `stage_index` out of `stage_count` stages.
pub fn step_label(stage_index: usize, stage_count: usize) -> String {
    format!("Step {} of {}", stage_index + 1, stage_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ApprovalStatus::*;

    fn state() -> RunState {
        RunState::initial(&WorkflowModel::builtin(), "success")
    }

    #[test]
    fn test_initial_state() {
        let s = state();
        assert_eq!(s.stage_statuses, vec![Pending, Inactive, Inactive, Inactive]);
        assert_eq!(s.current_stage_index, 0);
        assert!(!s.is_running);
        assert_eq!(s.selected_scenario_id, "success");
        assert_eq!(s.outcome(), None);
        assert_eq!(s.step_label(), "Step 1 of 4");
    }

    #[test]
    fn test_outcome() {
        let mut s = state();
        s.stage_statuses = vec![Approved, Rejected, Inactive, Inactive];
        assert_eq!(s.outcome(), Some(RunOutcome::Rejected { stage_index: 1 }));

        s.stage_statuses = vec![Approved; 4];
        assert_eq!(s.outcome(), Some(RunOutcome::Approved));
        assert_eq!(s.resolved_count(), 4);

        s.is_running = true;
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn test_progress_after_rejection() {
        let mut s = state();
        s.stage_statuses = vec![Approved, Rejected, Inactive, Inactive];
        s.current_stage_index = 1;
        assert_eq!(s.resolved_count(), 2);
        assert_eq!(s.step_label(), "Step 2 of 4");
        assert_eq!(step_label(3, 4), "Step 4 of 4");
    }

    #[test]
    fn test_restore_keeps_generation() {
        let mut s = state();
        s.generation = 7;
        s.current_stage_index = 2;
        s.stage_statuses = vec![Approved, Approved, Pending, Inactive];
        s.restore(&WorkflowModel::builtin());
        assert_eq!(s.generation, 7);
        assert_eq!(s.current_stage_index, 0);
        assert_eq!(s.stage_statuses, vec![Pending, Inactive, Inactive, Inactive]);
    }
}
