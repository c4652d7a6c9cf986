//! Validated workflow model and its built-in definition.
//!
//! A `WorkflowDefinition` is the raw, deserializable table of stages and
//! scenarios (either the built-in partner onboarding flow or a
//! `workflow.toml`). `WorkflowModel` is the validated form handed to the
//! sequencer: every rejection has been resolved to a stage and roster position.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::{ApprovalStatus, Outcome, Participant, Scenario, Stage};
use crate::errors::ConfigError;

/// The phase script is built around exactly this many stages.
pub const REQUIRED_STAGE_COUNT: usize = 4;

/// Scenario selected on startup and after a reset.
pub const DEFAULT_SCENARIO_ID: &str = "success";

/// Where a rejection scenario injects its rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionPoint {
    pub stage_index: usize,
    pub participant_index: usize,
}

/// Raw stage and scenario tables, as written in `workflow.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    pub stages: Vec<Stage>,
    pub scenarios: Vec<Scenario>,
}

impl WorkflowDefinition {
    /// Load a definition from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workflow file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse workflow file: {}", path.display()))
    }

    /// Parse a definition from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid workflow definition")
    }

    /// Save the definition as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize workflow definition")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write workflow file: {}", path.display()))?;
        Ok(())
    }

    /// Validate into a model.
    pub fn into_model(self) -> Result<WorkflowModel, ConfigError> {
        WorkflowModel::new(self.stages, self.scenarios)
    }

    /// The partner user onboarding flow shipped with the binary.
    pub fn builtin() -> Self {
        let omar_avatar = "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop";

        let stages = vec![
            Stage::new(
                "partner-creation",
                "Partner User Creation",
                "KAM user creates a new partner user in the system",
                vec![Participant::new(
                    "kam-1",
                    "Fatima Al-Zahra",
                    "KAM User",
                    "Key Account Management",
                    "https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
                )],
            ),
            Stage::new(
                "commercial-approval",
                "Commercial Approval",
                "Commercial Panda user reviews and approves/rejects the request",
                vec![Participant::new(
                    "commercial-1",
                    "Ahmed Hassan",
                    "Commercial Panda User",
                    "Commercial Operations",
                    "https://images.pexels.com/photos/1040880/pexels-photo-1040880.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
                )],
            )
            .rejectable(),
            Stage::new(
                "parallel-approval",
                "Parallel Approval Stage",
                "All three reviewers must approve for the request to proceed",
                vec![
                    Participant::new(
                        "fusion-1",
                        "Dr. Aisha Rahman",
                        "Fusion Parallel",
                        "Fusion Security",
                        "https://images.pexels.com/photos/1181690/pexels-photo-1181690.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
                    ),
                    Participant::new(
                        "cyber-1",
                        "Omar Malik",
                        "Cyber Parallel",
                        "Cyber Security",
                        omar_avatar,
                    ),
                    Participant::new(
                        "cyber-2",
                        "Zara Ibrahim",
                        "Cyber Parallel",
                        "Cyber Security",
                        "https://images.pexels.com/photos/1130626/pexels-photo-1130626.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
                    ),
                ],
            )
            .parallel()
            .rejectable(),
            Stage::new(
                "ready-activation",
                "Ready for Activation",
                "Cyber Security user activates the approved user",
                vec![Participant::new(
                    "cyber-activation",
                    "Omar Malik",
                    "Cyber Security (Activation)",
                    "Cyber Security",
                    omar_avatar,
                )],
            ),
        ];

        let scenarios = vec![
            Scenario::success(
                DEFAULT_SCENARIO_ID,
                "Complete Success Path",
                "All stages approve and user is successfully activated",
            ),
            Scenario::rejected(
                "commercial-reject",
                "Commercial Rejection",
                "Commercial Panda user rejects the request",
                "commercial-approval",
                "commercial-1",
            ),
            Scenario::rejected(
                "fusion-reject",
                "Fusion Rejection",
                "Fusion Parallel reviewer rejects the request",
                "parallel-approval",
                "fusion-1",
            ),
            Scenario::rejected(
                "cyber1-reject",
                "Cyber Security Rejection (Omar)",
                "Omar Malik rejects in parallel approval stage",
                "parallel-approval",
                "cyber-1",
            ),
            Scenario::rejected(
                "cyber2-reject",
                "Cyber Security Rejection (Zara)",
                "Zara Ibrahim rejects in parallel approval stage",
                "parallel-approval",
                "cyber-2",
            ),
        ];

        Self { stages, scenarios }
    }
}

/// Validated, read-only stage and scenario tables.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowModel {
    stages: Vec<Stage>,
    scenarios: Vec<Scenario>,
    /// Parallel to `scenarios`; `None` for the success scenario
    rejection_points: Vec<Option<RejectionPoint>>,
}

impl WorkflowModel {
    /// Validate stage and scenario tables.
    pub fn new(stages: Vec<Stage>, scenarios: Vec<Scenario>) -> Result<Self, ConfigError> {
        if stages.len() != REQUIRED_STAGE_COUNT {
            return Err(ConfigError::StageCount {
                expected: REQUIRED_STAGE_COUNT,
                actual: stages.len(),
            });
        }

        let mut stage_ids = HashSet::new();
        for stage in &stages {
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(ConfigError::DuplicateStageId(stage.id.clone()));
            }
            if stage.participants.is_empty() {
                return Err(ConfigError::EmptyRoster(stage.id.clone()));
            }
        }

        let mut scenario_ids = HashSet::new();
        for scenario in &scenarios {
            if !scenario_ids.insert(scenario.id.as_str()) {
                return Err(ConfigError::DuplicateScenarioId(scenario.id.clone()));
            }
        }

        let successes = scenarios.iter().filter(|s| s.is_success()).count();
        if successes != 1 {
            return Err(ConfigError::SuccessScenarioCount(successes));
        }

        let rejection_points = scenarios
            .iter()
            .map(|scenario| resolve_rejection(&stages, scenario))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stages,
            scenarios,
            rejection_points,
        })
    }

    /// The built-in partner onboarding model.
    pub fn builtin() -> Self {
        WorkflowDefinition::builtin()
            .into_model()
            .expect("built-in workflow definition is valid")
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Look up a scenario by id.
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn contains_scenario(&self, id: &str) -> bool {
        self.scenario(id).is_some()
    }

    /// The single success scenario.
    pub fn success_scenario(&self) -> &Scenario {
        // Validation guarantees exactly one.
        self.scenarios
            .iter()
            .find(|s| s.is_success())
            .unwrap_or(&self.scenarios[0])
    }

    /// Scenario selected on startup and after reset: `"success"` when present,
    /// otherwise the table's success scenario.
    pub fn default_scenario_id(&self) -> &str {
        self.scenario(DEFAULT_SCENARIO_ID)
            .unwrap_or_else(|| self.success_scenario())
            .id
            .as_str()
    }

    /// Resolved rejection point for a scenario id.
    pub fn rejection_point(&self, scenario_id: &str) -> Option<RejectionPoint> {
        let index = self.scenarios.iter().position(|s| s.id == scenario_id)?;
        self.rejection_points[index]
    }

    /// Display label: the participant who rejects in this scenario.
    pub fn rejected_by(&self, scenario_id: &str) -> Option<&Participant> {
        let point = self.rejection_point(scenario_id)?;
        self.stages[point.stage_index]
            .participants
            .get(point.participant_index)
    }

    /// Display label: the stage where this scenario is rejected.
    pub fn rejected_at(&self, scenario_id: &str) -> Option<&Stage> {
        let point = self.rejection_point(scenario_id)?;
        self.stages.get(point.stage_index)
    }

    /// Status vector a run starts from: first stage pending, the rest inactive.
    pub fn initial_statuses(&self) -> Vec<ApprovalStatus> {
        (0..self.stages.len())
            .map(|index| {
                if index == 0 {
                    ApprovalStatus::Pending
                } else {
                    ApprovalStatus::Inactive
                }
            })
            .collect()
    }

    /// Empty vote table matching each stage's roster.
    pub fn empty_votes(&self) -> Vec<Vec<Option<super::Vote>>> {
        self.stages
            .iter()
            .map(|stage| vec![None; stage.participants.len()])
            .collect()
    }
}

fn resolve_rejection(
    stages: &[Stage],
    scenario: &Scenario,
) -> Result<Option<RejectionPoint>, ConfigError> {
    let Outcome::Rejected { stage, participant } = &scenario.outcome else {
        return Ok(None);
    };

    let stage_index = stages
        .iter()
        .position(|s| &s.id == stage)
        .ok_or_else(|| ConfigError::UnknownStage {
            scenario: scenario.id.clone(),
            stage: stage.clone(),
        })?;

    let target = &stages[stage_index];
    if !target.can_reject {
        return Err(ConfigError::StageCannotReject {
            scenario: scenario.id.clone(),
            stage: stage.clone(),
        });
    }

    let participant_index =
        target
            .participant_index(participant)
            .ok_or_else(|| ConfigError::UnknownParticipant {
                scenario: scenario.id.clone(),
                stage: stage.clone(),
                participant: participant.clone(),
            })?;

    Ok(Some(RejectionPoint {
        stage_index,
        participant_index,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> WorkflowDefinition {
        WorkflowDefinition::builtin()
    }

    #[test]
    fn test_builtin_model_is_valid() {
        let model = WorkflowModel::builtin();
        assert_eq!(model.stage_count(), 4);
        assert_eq!(model.scenarios().len(), 5);
        assert_eq!(model.success_scenario().id, "success");
        assert_eq!(model.default_scenario_id(), "success");
    }

    #[test]
    fn test_builtin_rejection_points() {
        let model = WorkflowModel::builtin();
        assert_eq!(model.rejection_point("success"), None);
        assert_eq!(
            model.rejection_point("commercial-reject"),
            Some(RejectionPoint {
                stage_index: 1,
                participant_index: 0
            })
        );
        for (id, participant_index) in [("fusion-reject", 0), ("cyber1-reject", 1), ("cyber2-reject", 2)] {
            assert_eq!(
                model.rejection_point(id),
                Some(RejectionPoint {
                    stage_index: 2,
                    participant_index
                }),
                "scenario {id}"
            );
        }
    }

    #[test]
    fn test_display_labels_derive_from_outcome() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            model.rejected_by("commercial-reject").map(|p| p.name.as_str()),
            Some("Ahmed Hassan")
        );
        assert_eq!(
            model.rejected_at("cyber2-reject").map(|s| s.title.as_str()),
            Some("Parallel Approval Stage")
        );
        assert_eq!(
            model.rejected_by("cyber2-reject").map(|p| p.name.as_str()),
            Some("Zara Ibrahim")
        );
        assert!(model.rejected_by("success").is_none());
        assert!(model.rejected_by("missing").is_none());
    }

    #[test]
    fn test_initial_statuses() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            model.initial_statuses(),
            vec![
                ApprovalStatus::Pending,
                ApprovalStatus::Inactive,
                ApprovalStatus::Inactive,
                ApprovalStatus::Inactive
            ]
        );
        let votes = model.empty_votes();
        assert_eq!(votes.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 1, 3, 1]);
    }

    #[test]
    fn test_rejects_wrong_stage_count() {
        let mut def = definition();
        def.stages.pop();
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::StageCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_stage_id() {
        let mut def = definition();
        def.stages[3].id = "partner-creation".to_string();
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::DuplicateStageId("partner-creation".to_string())
        );
    }

    #[test]
    fn test_rejects_missing_or_extra_success() {
        let mut def = definition();
        def.scenarios.remove(0);
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::SuccessScenarioCount(0)
        );

        let mut def = definition();
        def.scenarios
            .push(Scenario::success("also-success", "Again", ""));
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::SuccessScenarioCount(2)
        );
    }

    #[test]
    fn test_rejects_duplicate_scenario_id() {
        let mut def = definition();
        def.scenarios[2].id = "commercial-reject".to_string();
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::DuplicateScenarioId("commercial-reject".to_string())
        );
    }

    #[test]
    fn test_rejects_rejection_at_non_rejecting_stage() {
        let mut def = definition();
        def.scenarios.push(Scenario::rejected(
            "activation-reject",
            "Activation Rejection",
            "",
            "ready-activation",
            "cyber-activation",
        ));
        assert!(matches!(
            def.into_model().unwrap_err(),
            ConfigError::StageCannotReject { .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_stage_and_participant() {
        let mut def = definition();
        def.scenarios
            .push(Scenario::rejected("x", "X", "", "legal-review", "kam-1"));
        assert!(matches!(
            def.into_model().unwrap_err(),
            ConfigError::UnknownStage { .. }
        ));

        let mut def = definition();
        def.scenarios.push(Scenario::rejected(
            "x",
            "X",
            "",
            "commercial-approval",
            "fusion-1",
        ));
        assert!(matches!(
            def.into_model().unwrap_err(),
            ConfigError::UnknownParticipant { .. }
        ));
    }

    #[test]
    fn test_rejects_empty_roster() {
        let mut def = definition();
        def.stages[0].participants.clear();
        assert_eq!(
            def.into_model().unwrap_err(),
            ConfigError::EmptyRoster("partner-creation".to_string())
        );
    }

    #[test]
    fn test_definition_toml_round_trip_keeps_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.toml");
        definition().save(&path).unwrap();

        let loaded = WorkflowDefinition::load(&path).unwrap();
        assert_eq!(loaded, definition());
        assert_eq!(loaded.into_model().unwrap(), WorkflowModel::builtin());
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.toml");
        std::fs::write(&path, "stages = 3").unwrap();

        let err = WorkflowDefinition::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("workflow.toml"));
    }
}
