//! Run notifications for renderers that track transitions instead of
//! snapshots.

use serde::{Deserialize, Serialize};

use super::RunOutcome;
use crate::workflow::ApprovalStatus;

/// Event emitted by the sequencer. Every event carries the run epoch it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        generation: u64,
        scenario_id: String,
    },
    StageChanged {
        generation: u64,
        stage_index: usize,
        stage_id: String,
        from: ApprovalStatus,
        to: ApprovalStatus,
    },
    Finished {
        generation: u64,
        outcome: Option<RunOutcome>,
    },
    Reset {
        generation: u64,
    },
}

impl RunEvent {
    pub fn generation(&self) -> u64 {
        match self {
            RunEvent::Started { generation, .. }
            | RunEvent::StageChanged { generation, .. }
            | RunEvent::Finished { generation, .. }
            | RunEvent::Reset { generation } => *generation,
        }
    }

    /// Check whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Finished { .. } | RunEvent::Reset { .. })
    }

    /// Check whether this event belongs to the run started with `generation`.
    ///
    /// A reset that cancels the run carries the next epoch; a reset after the
    /// run finished keeps the same one.
    pub fn concerns(&self, generation: u64) -> bool {
        match self {
            RunEvent::Reset { generation: epoch } => {
                *epoch == generation || *epoch == generation + 1
            }
            _ => self.generation() == generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = RunEvent::StageChanged {
            generation: 1,
            stage_index: 1,
            stage_id: "commercial-approval".to_string(),
            from: ApprovalStatus::Pending,
            to: ApprovalStatus::Rejected,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "stage_changed");
        assert_eq!(json["to"], "rejected");
        assert_eq!(event.generation(), 1);
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_events_scoped_to_their_run() {
        let changed = |generation| RunEvent::StageChanged {
            generation,
            stage_index: 0,
            stage_id: "partner-creation".to_string(),
            from: ApprovalStatus::Pending,
            to: ApprovalStatus::Approved,
        };
        assert!(changed(2).concerns(2));
        assert!(!changed(1).concerns(2));
        assert!(!changed(3).concerns(2));

        assert!(RunEvent::Reset { generation: 3 }.concerns(2));
        assert!(RunEvent::Reset { generation: 2 }.concerns(2));
        assert!(!RunEvent::Reset { generation: 1 }.concerns(2));
        assert!(!RunEvent::Reset { generation: 5 }.concerns(2));
    }

    #[test]
    fn test_finished_is_terminal() {
        let event = RunEvent::Finished {
            generation: 3,
            outcome: Some(RunOutcome::Rejected { stage_index: 2 }),
        };
        assert!(event.is_terminal());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"]["result"], "rejected");
        assert_eq!(json["outcome"]["stage_index"], 2);
    }
}
