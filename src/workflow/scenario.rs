//! Pre-scripted run outcomes.

use serde::{Deserialize, Serialize};

/// How a scenario ends.
///
/// A rejection names the stage and the participant by id, so the branch the
/// sequencer takes and the "rejected by / at" labels come from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Rejected {
        /// Stage id where the rejection is injected
        stage: String,
        /// Participant id of the rejecting reviewer
        participant: String,
    },
}

/// A named, scripted path through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub outcome: Outcome,
}

impl Scenario {
    pub fn success(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            outcome: Outcome::Success,
        }
    }

    pub fn rejected(
        id: &str,
        title: &str,
        description: &str,
        stage: &str,
        participant: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            outcome: Outcome::Rejected {
                stage: stage.to_string(),
                participant: participant.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_parses_from_toml_inline_table() {
        let scenario: Scenario = toml::from_str(
            r#"
id = "fusion-reject"
title = "Fusion Rejection"
outcome = { kind = "rejected", stage = "parallel-approval", participant = "fusion-1" }
"#,
        )
        .unwrap();

        assert!(!scenario.is_success());
        assert_eq!(
            scenario.outcome,
            Outcome::Rejected {
                stage: "parallel-approval".to_string(),
                participant: "fusion-1".to_string(),
            }
        );
    }

    #[test]
    fn test_success_outcome_tag() {
        let scenario: Scenario =
            toml::from_str("id = \"success\"\ntitle = \"Ok\"\noutcome = { kind = \"success\" }\n")
                .unwrap();
        assert!(scenario.is_success());
        assert!(scenario.description.is_empty());
    }
}
