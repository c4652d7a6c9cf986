//! Phase scripts: the timed steps a scenario plays through.
//!
//! A script is derived from the scenario's outcome and the stage pacing. Each
//! stage contributes one step, in stage order: an approval after the stage's
//! approve delay, or, at the rejecting stage, a rejection after its reject
//! delay, which ends the script.

use std::time::Duration;

use crate::errors::ConfigError;
use crate::workflow::{Vote, WorkflowModel};

/// Delays for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePacing {
    pub approve_after: Duration,
    pub reject_after: Duration,
}

impl Default for StagePacing {
    fn default() -> Self {
        Self::from_millis(4000, 4000)
    }
}

impl StagePacing {
    pub const fn from_millis(approve_after_ms: u64, reject_after_ms: u64) -> Self {
        Self {
            approve_after: Duration::from_millis(approve_after_ms),
            reject_after: Duration::from_millis(reject_after_ms),
        }
    }

    /// Demo pacing for the built-in stages.
    pub fn builtin(stage_id: &str) -> Self {
        match stage_id {
            "partner-creation" => Self::from_millis(4000, 4000),
            "commercial-approval" => Self::from_millis(5000, 3000),
            "parallel-approval" => Self::from_millis(6000, 4000),
            "ready-activation" => Self::from_millis(4000, 4000),
            _ => Self::default(),
        }
    }
}

/// Per-stage pacing for a model, plus a global time scale.
///
/// Scaled delays are computed eagerly, so a scale or override that does not
/// fit in a `Duration` is rejected here instead of at playback.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    stage_ids: Vec<String>,
    stages: Vec<StagePacing>,
    scaled: Vec<StagePacing>,
    scale: f64,
}

impl Pacing {
    /// Built-in pacing for every stage of `model`, at real-time scale.
    pub fn for_model(model: &WorkflowModel) -> Self {
        let stage_ids: Vec<String> = model.stages().iter().map(|s| s.id.clone()).collect();
        let stages: Vec<StagePacing> = stage_ids.iter().map(|id| StagePacing::builtin(id)).collect();
        Self {
            stage_ids,
            scaled: stages.clone(),
            stages,
            scale: 1.0,
        }
    }

    /// Replace one or both delays of a stage.
    pub fn override_stage(
        &mut self,
        stage_id: &str,
        approve_after: Option<Duration>,
        reject_after: Option<Duration>,
    ) -> Result<(), ConfigError> {
        let index = self
            .stage_ids
            .iter()
            .position(|id| id == stage_id)
            .ok_or_else(|| ConfigError::UnknownPacingStage(stage_id.to_string()))?;

        let mut pacing = self.stages[index];
        if let Some(delay) = approve_after {
            pacing.approve_after = delay;
        }
        if let Some(delay) = reject_after {
            pacing.reject_after = delay;
        }
        self.scaled[index] = scale_stage(stage_id, pacing, self.scale)?;
        self.stages[index] = pacing;
        Ok(())
    }

    /// Multiply every delay by `scale`.
    pub fn with_scale(mut self, scale: f64) -> Result<Self, ConfigError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidTimeScale(scale));
        }
        self.scaled = self
            .stage_ids
            .iter()
            .zip(&self.stages)
            .map(|(id, pacing)| scale_stage(id, *pacing, scale))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        self.scale = scale;
        Ok(self)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scaled delays for a stage.
    pub fn stage(&self, index: usize) -> StagePacing {
        self.scaled.get(index).copied().unwrap_or_default()
    }
}

fn scale_stage(stage_id: &str, pacing: StagePacing, scale: f64) -> Result<StagePacing, ConfigError> {
    let scale_delay = |delay: Duration| {
        Duration::try_from_secs_f64(delay.as_secs_f64() * scale).map_err(|_| {
            ConfigError::PacingOverflow {
                stage: stage_id.to_string(),
                scale,
            }
        })
    };
    Ok(StagePacing {
        approve_after: scale_delay(pacing.approve_after)?,
        reject_after: scale_delay(pacing.reject_after)?,
    })
}

/// One timed step: wait `delay`, then decide `stage_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub delay: Duration,
    pub stage_index: usize,
    pub verdict: Vote,
    /// Rejecting participant's roster position, for reject steps
    pub participant_index: Option<usize>,
}

/// Build the script for a scenario. Returns `None` for an unknown scenario id.
pub fn build_script(model: &WorkflowModel, scenario_id: &str, pacing: &Pacing) -> Option<Vec<Step>> {
    model.scenario(scenario_id)?;
    let rejection = model.rejection_point(scenario_id);

    let mut steps = Vec::with_capacity(model.stage_count());
    for stage_index in 0..model.stage_count() {
        let delays = pacing.stage(stage_index);
        match rejection {
            Some(point) if point.stage_index == stage_index => {
                steps.push(Step {
                    delay: delays.reject_after,
                    stage_index,
                    verdict: Vote::Reject,
                    participant_index: Some(point.participant_index),
                });
                break;
            }
            _ => steps.push(Step {
                delay: delays.approve_after,
                stage_index,
                verdict: Vote::Approve,
                participant_index: None,
            }),
        }
    }
    Some(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn delays(steps: &[Step]) -> Vec<(Duration, Vote)> {
        steps.iter().map(|s| (s.delay, s.verdict)).collect()
    }

    #[test]
    fn test_success_script() {
        let model = WorkflowModel::builtin();
        let script = build_script(&model, "success", &Pacing::for_model(&model)).unwrap();
        assert_eq!(
            delays(&script),
            vec![
                (ms(4000), Vote::Approve),
                (ms(5000), Vote::Approve),
                (ms(6000), Vote::Approve),
                (ms(4000), Vote::Approve),
            ]
        );
    }

    #[test]
    fn test_commercial_reject_script() {
        let model = WorkflowModel::builtin();
        let script =
            build_script(&model, "commercial-reject", &Pacing::for_model(&model)).unwrap();
        assert_eq!(
            delays(&script),
            vec![(ms(4000), Vote::Approve), (ms(3000), Vote::Reject)]
        );
        assert_eq!(script[1].stage_index, 1);
        assert_eq!(script[1].participant_index, Some(0));
    }

    #[test]
    fn test_parallel_reject_scripts_share_timing() {
        let model = WorkflowModel::builtin();
        let pacing = Pacing::for_model(&model);
        for (id, participant) in [("fusion-reject", 0), ("cyber1-reject", 1), ("cyber2-reject", 2)] {
            let script = build_script(&model, id, &pacing).unwrap();
            assert_eq!(
                delays(&script),
                vec![
                    (ms(4000), Vote::Approve),
                    (ms(5000), Vote::Approve),
                    (ms(4000), Vote::Reject),
                ],
                "scenario {id}"
            );
            assert_eq!(script[2].participant_index, Some(participant));
        }
    }

    #[test]
    fn test_unknown_scenario_has_no_script() {
        let model = WorkflowModel::builtin();
        assert!(build_script(&model, "nope", &Pacing::for_model(&model)).is_none());
    }

    #[test]
    fn test_scale_and_override() {
        let model = WorkflowModel::builtin();
        let mut pacing = Pacing::for_model(&model);
        pacing
            .override_stage("commercial-approval", None, Some(ms(1000)))
            .unwrap();
        let pacing = pacing.with_scale(0.5).unwrap();

        assert_eq!(pacing.stage(0).approve_after, ms(2000));
        assert_eq!(pacing.stage(1).approve_after, ms(2500));
        assert_eq!(pacing.stage(1).reject_after, ms(500));
    }

    #[test]
    fn test_invalid_pacing() {
        let model = WorkflowModel::builtin();
        let mut pacing = Pacing::for_model(&model);
        assert_eq!(
            pacing.override_stage("legal", Some(ms(1)), None),
            Err(ConfigError::UnknownPacingStage("legal".to_string()))
        );
        assert!(pacing.clone().with_scale(0.0).is_err());
        assert!(pacing.clone().with_scale(-1.0).is_err());
        assert!(pacing.with_scale(f64::NAN).is_err());
    }

    #[test]
    fn test_scale_overflow_is_rejected() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            Pacing::for_model(&model).with_scale(1e300),
            Err(ConfigError::PacingOverflow {
                stage: "partner-creation".to_string(),
                scale: 1e300,
            })
        );

        let mut pacing = Pacing::for_model(&model).with_scale(1e6).unwrap();
        assert_eq!(pacing.stage(0).approve_after, Duration::from_secs(4_000_000));
        let err = pacing
            .override_stage("ready-activation", Some(Duration::from_secs(u64::MAX / 2)), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::PacingOverflow { ref stage, .. } if stage == "ready-activation"));
        assert_eq!(pacing.stage(3).approve_after, Duration::from_secs(4_000_000));
    }
}
