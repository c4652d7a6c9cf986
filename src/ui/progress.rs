//! Terminal renderer for approval runs.
//!
//! This module provides a read-only observer of the sequencer. It supports
//! multiple output modes:
//! - `full`: progress bar over resolved stages with colored stage lines
//! - `minimal`: plain status lines
//! - `json`: one JSON `RunEvent` per line, final `RunState` last

use crate::sequencer::{RunEvent, RunOutcome, RunState, step_label};
use crate::ui::icons::{CHECK, CROSS, HOURGLASS, IDLE, RUNNING, SPARKLE, STOP};
use crate::workflow::{ApprovalStatus, WorkflowModel};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;

/// Output mode for the flow UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Rich terminal UI with a progress bar
    #[default]
    Full,
    /// Plain status lines
    Minimal,
    /// JSON-formatted events
    Json,
}

impl std::str::FromStr for UiMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "minimal" => Self::Minimal,
            _ => Self::Full,
        })
    }
}

impl UiMode {
    /// Parse UI mode from string, defaulting to `Full`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Plain-text description of a stage transition.
///
/// `scenario_id` supplies the rejecting reviewer's name for rejections.
pub fn describe_change(
    model: &WorkflowModel,
    scenario_id: Option<&str>,
    stage_index: usize,
    to: ApprovalStatus,
) -> String {
    let Some(stage) = model.stages().get(stage_index) else {
        return format!("stage {} {}", stage_index + 1, to);
    };

    match to {
        ApprovalStatus::Pending => {
            let reviewers: Vec<&str> = stage.participants.iter().map(|p| p.name.as_str()).collect();
            let joiner = if stage.parallel { " + " } else { ", " };
            format!("{} awaiting {}", stage.title, reviewers.join(joiner))
        }
        ApprovalStatus::Approved => format!("{} approved", stage.title),
        ApprovalStatus::Rejected => match scenario_id.and_then(|id| model.rejected_by(id)) {
            Some(participant) => format!("{} rejected by {}", stage.title, participant.name),
            None => format!("{} rejected", stage.title),
        },
        ApprovalStatus::Inactive => format!("{} inactive", stage.title),
    }
}

/// Plain-text summary of a finished run.
pub fn describe_outcome(model: &WorkflowModel, outcome: Option<RunOutcome>) -> String {
    match outcome {
        Some(RunOutcome::Approved) => "Partner user approved and activated".to_string(),
        Some(RunOutcome::Rejected { stage_index }) => {
            let title = model
                .stages()
                .get(stage_index)
                .map_or("unknown stage", |s| s.title.as_str());
            format!("Request rejected at {}", title)
        }
        None => "Run did not reach a decision".to_string(),
    }
}

/// Observer UI for a sequencer run.
pub struct FlowUI {
    mode: UiMode,
    model: WorkflowModel,
    bar: ProgressBar,
    /// Scenario of the run currently being rendered
    scenario: Mutex<Option<String>>,
    verbose: bool,
    term: Term,
}

impl FlowUI {
    pub fn new(model: &WorkflowModel, mode: UiMode, verbose: bool) -> Self {
        let bar = if mode == UiMode::Full {
            let style = ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress bar template is a valid static string")
                .progress_chars("█▓▒░");
            let bar = ProgressBar::new(model.stage_count() as u64);
            bar.set_style(style);
            bar.set_prefix("Stages");
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            mode,
            model: model.clone(),
            bar,
            scenario: Mutex::new(None),
            verbose,
            term: Term::stdout(),
        }
    }

    fn scenario(&self) -> Option<String> {
        self.scenario
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Print a line above the bar, falling back to stdout if the bar is gone.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.mode == UiMode::Full && !self.bar.is_finished() {
            self.bar.println(msg.as_ref());
        } else {
            let _ = writeln!(&self.term, "{}", msg.as_ref());
        }
    }

    /// Render one event.
    pub fn handle_event(&self, event: &RunEvent) {
        match self.mode {
            UiMode::Json => self.handle_json(event),
            UiMode::Minimal => self.handle_text(event, false),
            UiMode::Full => self.handle_text(event, true),
        }
    }

    fn handle_json(&self, event: &RunEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(&self.term, "{}", json);
        }
    }

    fn handle_text(&self, event: &RunEvent, rich: bool) {
        match event {
            RunEvent::Started {
                generation,
                scenario_id,
            } => {
                *self
                    .scenario
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(scenario_id.clone());
                let title = self
                    .model
                    .scenario(scenario_id)
                    .map_or(scenario_id.as_str(), |s| s.title.as_str());
                if rich {
                    self.bar.set_position(0);
                    self.bar.set_message(format!("{}", style(title).yellow()));
                    self.print_line(format!("{}{}", RUNNING, style(title).bold()));
                } else {
                    self.print_line(format!("Running: {}", title));
                }
                if self.verbose {
                    self.print_line(format!("  run #{}", generation));
                }
            }
            RunEvent::StageChanged {
                stage_index, to, ..
            } => {
                let scenario = self.scenario();
                let text = describe_change(&self.model, scenario.as_deref(), *stage_index, *to);
                if !rich {
                    self.print_line(format!("[{}] {}", to, text));
                    return;
                }
                let line = match to {
                    ApprovalStatus::Pending => {
                        let step = step_label(*stage_index, self.model.stage_count());
                        self.bar.set_message(format!(
                            "{} {}",
                            style(step).cyan(),
                            self.model.stages()[*stage_index].title
                        ));
                        format!("  {}{}", HOURGLASS, style(text).yellow())
                    }
                    ApprovalStatus::Approved => {
                        self.bar.inc(1);
                        format!("  {}{}", CHECK, style(text).green())
                    }
                    ApprovalStatus::Rejected => {
                        self.bar.inc(1);
                        format!("  {}{}", CROSS, style(text).red().bold())
                    }
                    ApprovalStatus::Inactive => format!("  {}{}", IDLE, style(text).dim()),
                };
                self.print_line(line);
            }
            RunEvent::Finished { outcome, .. } => {
                let text = describe_outcome(&self.model, *outcome);
                if rich {
                    self.bar.finish_and_clear();
                    let line = match outcome {
                        Some(RunOutcome::Approved) => {
                            format!("{}{}", SPARKLE, style(text).green().bold())
                        }
                        _ => format!("{}{}", CROSS, style(text).red().bold()),
                    };
                    self.print_line(line);
                } else {
                    self.print_line(format!("Done: {}", text));
                }
            }
            RunEvent::Reset { .. } => {
                if rich {
                    self.bar.finish_and_clear();
                    self.print_line(format!("{}{}", STOP, style("Run reset").yellow()));
                } else {
                    self.print_line("Reset");
                }
            }
        }
    }

    /// Print the final state of the run.
    pub fn finish(&self, state: &RunState) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }

        if self.mode == UiMode::Json {
            if let Ok(json) = serde_json::to_string(state) {
                let _ = writeln!(&self.term, "{}", json);
            }
            return;
        }

        let _ = writeln!(&self.term);
        for (stage, status) in self.model.stages().iter().zip(&state.stage_statuses) {
            let icon = match status {
                ApprovalStatus::Approved => CHECK,
                ApprovalStatus::Rejected => CROSS,
                ApprovalStatus::Pending => HOURGLASS,
                ApprovalStatus::Inactive => IDLE,
            };
            let _ = writeln!(&self.term, "{}{:<28} {}", icon, stage.title, status);
        }
        let _ = writeln!(
            &self.term,
            "{} of {} stages decided, stopped at {}",
            state.resolved_count(),
            state.stage_statuses.len(),
            state.step_label()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_mode_parse() {
        assert_eq!(UiMode::parse("json"), UiMode::Json);
        assert_eq!(UiMode::parse("MINIMAL"), UiMode::Minimal);
        assert_eq!(UiMode::parse("full"), UiMode::Full);
        assert_eq!(UiMode::parse("anything"), UiMode::Full);
    }

    #[test]
    fn test_describe_pending_lists_reviewers() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            describe_change(&model, None, 2, ApprovalStatus::Pending),
            "Parallel Approval Stage awaiting Dr. Aisha Rahman + Omar Malik + Zara Ibrahim"
        );
        assert_eq!(
            describe_change(&model, None, 1, ApprovalStatus::Pending),
            "Commercial Approval awaiting Ahmed Hassan"
        );
    }

    #[test]
    fn test_describe_rejection_names_reviewer() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            describe_change(&model, Some("cyber1-reject"), 2, ApprovalStatus::Rejected),
            "Parallel Approval Stage rejected by Omar Malik"
        );
        assert_eq!(
            describe_change(&model, None, 1, ApprovalStatus::Rejected),
            "Commercial Approval rejected"
        );
    }

    #[test]
    fn test_describe_outcome() {
        let model = WorkflowModel::builtin();
        assert_eq!(
            describe_outcome(&model, Some(RunOutcome::Rejected { stage_index: 1 })),
            "Request rejected at Commercial Approval"
        );
        assert!(describe_outcome(&model, Some(RunOutcome::Approved)).contains("activated"));
        assert!(describe_outcome(&model, None).contains("did not"));
    }
}
