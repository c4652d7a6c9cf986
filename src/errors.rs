//! Typed error hierarchy for the approval flow.
//!
//! Two top-level enums cover the two subsystems:
//! - `ConfigError`: malformed stage/scenario tables or pacing, raised once at startup
//! - `SequencerError`: rejected calls against a running sequencer

use thiserror::Error;

/// Errors raised while building a workflow model or its pacing.
///
/// These are fail-fast: a model that produces one of these is never handed to
/// a sequencer.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Workflow must have exactly {expected} stages, found {actual}")]
    StageCount { expected: usize, actual: usize },

    #[error("Duplicate stage id '{0}'")]
    DuplicateStageId(String),

    #[error("Duplicate scenario id '{0}'")]
    DuplicateScenarioId(String),

    #[error("Stage '{0}' has no participants")]
    EmptyRoster(String),

    #[error("Scenario table must contain exactly one success scenario, found {0}")]
    SuccessScenarioCount(usize),

    #[error("Scenario '{scenario}' rejects at unknown stage '{stage}'")]
    UnknownStage { scenario: String, stage: String },

    #[error("Scenario '{scenario}' rejects at stage '{stage}', which cannot reject")]
    StageCannotReject { scenario: String, stage: String },

    #[error("Scenario '{scenario}' is rejected by '{participant}', who is not a reviewer on stage '{stage}'")]
    UnknownParticipant {
        scenario: String,
        stage: String,
        participant: String,
    },

    #[error("Pacing override names unknown stage '{0}'")]
    UnknownPacingStage(String),

    #[error("Time scale must be a finite number greater than zero, got {0}")]
    InvalidTimeScale(f64),

    #[error("Delays for stage '{stage}' do not fit at time scale {scale}")]
    PacingOverflow { stage: String, scale: f64 },
}

/// Errors from sequencer operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("Unknown scenario '{0}'")]
    InvalidScenario(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_count_message_carries_both_counts() {
        let err = ConfigError::StageCount {
            expected: 4,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn unknown_participant_is_matchable() {
        let err = ConfigError::UnknownParticipant {
            scenario: "fusion-reject".to_string(),
            stage: "parallel-approval".to_string(),
            participant: "nobody".to_string(),
        };
        match &err {
            ConfigError::UnknownParticipant { participant, .. } => {
                assert_eq!(participant, "nobody");
            }
            _ => panic!("Expected UnknownParticipant"),
        }
    }

    #[test]
    fn invalid_scenario_names_the_id() {
        let err = SequencerError::InvalidScenario("bogus".to_string());
        assert_eq!(err.to_string(), "Unknown scenario 'bogus'");
    }

    #[test]
    fn sequencer_error_converts_into_anyhow() {
        let err: anyhow::Error = SequencerError::InvalidScenario("x".to_string()).into();
        assert!(err.downcast_ref::<SequencerError>().is_some());
    }
}
