use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::script::{Pacing, Step, build_script};
use super::{RunEvent, RunState};
use crate::errors::SequencerError;
use crate::workflow::{ApprovalStatus, Vote, WorkflowModel, reduce_votes};

const EVENT_CAPACITY: usize = 64;

/// Result of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A run began with this epoch
    Started { generation: u64 },
    /// A run was already active; nothing changed
    Ignored,
}

/// Drives one scripted run at a time over a shared `RunState`.
///
/// Cloning yields another handle to the same sequencer. Every mutation of the
/// run state goes through the `watch` sender, which serializes writers; phase
/// continuations check the run epoch under that lock before applying, so a
/// superseded timer can never write.
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<Inner>,
}

struct Inner {
    model: WorkflowModel,
    pacing: Pacing,
    state: watch::Sender<RunState>,
    events: broadcast::Sender<RunEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Sequencer {
    pub fn new(model: WorkflowModel, pacing: Pacing) -> Self {
        let initial = RunState::initial(&model, model.default_scenario_id());
        let (state, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                model,
                pacing,
                state,
                events,
                task: Mutex::new(None),
            }),
        }
    }

    /// Sequencer over the built-in model at demo pacing.
    pub fn builtin() -> Self {
        let model = WorkflowModel::builtin();
        let pacing = Pacing::for_model(&model);
        Self::new(model, pacing)
    }

    pub fn model(&self) -> &WorkflowModel {
        &self.inner.model
    }

    /// Current run state.
    pub fn snapshot(&self) -> RunState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.inner.state.subscribe()
    }

    /// Receiver for transition events emitted after this call.
    pub fn events(&self) -> broadcast::Receiver<RunEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().is_running
    }

    /// Select the scenario for the next run.
    ///
    /// Returns `Ok(false)` without changing anything while a run is active.
    pub fn select_scenario(&self, scenario_id: &str) -> Result<bool, SequencerError> {
        if !self.inner.model.contains_scenario(scenario_id) {
            return Err(SequencerError::InvalidScenario(scenario_id.to_string()));
        }

        let selected = self.inner.state.send_if_modified(|state| {
            if state.is_running {
                return false;
            }
            if state.selected_scenario_id != scenario_id {
                state.selected_scenario_id = scenario_id.to_string();
            }
            true
        });

        if selected {
            debug!(scenario = scenario_id, "scenario selected");
        } else {
            debug!(scenario = scenario_id, "scenario selection ignored, run in progress");
        }
        Ok(selected)
    }

    /// Start a run of the currently selected scenario.
    pub fn start_selected(&self) -> Result<StartOutcome, SequencerError> {
        let scenario_id = self.inner.state.borrow().selected_scenario_id.clone();
        self.start(&scenario_id)
    }

    /// Start a run of `scenario_id`.
    ///
    /// The script executes on a spawned task, so this must be called from
    /// within a tokio runtime. When a run is already active the call is
    /// ignored and the active run continues untouched.
    pub fn start(&self, scenario_id: &str) -> Result<StartOutcome, SequencerError> {
        let inner = &self.inner;
        let script = build_script(&inner.model, scenario_id, &inner.pacing)
            .ok_or_else(|| SequencerError::InvalidScenario(scenario_id.to_string()))?;

        let mut generation = None;
        inner.state.send_if_modified(|state| {
            if state.is_running {
                return false;
            }
            state.generation += 1;
            state.restore(&inner.model);
            state.is_running = true;
            state.selected_scenario_id = scenario_id.to_string();
            generation = Some(state.generation);
            let _ = inner.events.send(RunEvent::Started {
                generation: state.generation,
                scenario_id: scenario_id.to_string(),
            });
            true
        });

        let Some(generation) = generation else {
            debug!(scenario = scenario_id, "start ignored, run in progress");
            return Ok(StartOutcome::Ignored);
        };

        info!(scenario = scenario_id, generation, steps = script.len(), "run started");

        let handle = tokio::spawn(play(Arc::clone(inner), generation, script));
        let mut slot = inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handle);

        Ok(StartOutcome::Started { generation })
    }

    /// Cancel any active run and restore the initial state.
    ///
    /// Pending continuations of the cancelled run are invalidated
    /// immediately. Resetting an idle sequencer leaves the epoch unchanged,
    /// so repeated resets produce identical state.
    pub fn reset(&self) {
        let inner = &self.inner;
        let default_scenario = inner.model.default_scenario_id().to_string();

        let mut cancelled = None;
        inner.state.send_modify(|state| {
            if state.is_running {
                state.generation += 1;
                cancelled = Some(state.generation);
            }
            state.restore(&inner.model);
            state.is_running = false;
            state.selected_scenario_id = default_scenario;
            let _ = inner.events.send(RunEvent::Reset {
                generation: state.generation,
            });
        });

        let handle = inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }

        match cancelled {
            Some(generation) => info!(generation, "active run cancelled by reset"),
            None => debug!("reset while idle"),
        }
    }

    /// Wait until no run is active and return the state at that point.
    pub async fn wait_until_idle(&self) -> RunState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_running).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

/// Execute a script for one epoch, stopping as soon as the epoch is stale.
async fn play(inner: Arc<Inner>, generation: u64, script: Vec<Step>) {
    let last = script.len().saturating_sub(1);
    for (position, step) in script.into_iter().enumerate() {
        tokio::time::sleep(step.delay).await;
        if !inner.apply(generation, &step, position == last) {
            debug!(generation, stage = step.stage_index, "stale continuation dropped");
            return;
        }
    }
}

impl Inner {
    /// Apply one step if `generation` is still the active run. Returns whether
    /// it applied.
    fn apply(&self, generation: u64, step: &Step, finishing: bool) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if state.generation != generation || !state.is_running {
                return false;
            }
            applied = true;

            let stage_index = step.stage_index;
            let votes = &mut state.votes[stage_index];
            match (step.verdict, step.participant_index) {
                (Vote::Approve, _) => votes.iter_mut().for_each(|v| *v = Some(Vote::Approve)),
                (Vote::Reject, Some(participant)) => {
                    if let Some(vote) = votes.get_mut(participant) {
                        *vote = Some(Vote::Reject);
                    }
                }
                (Vote::Reject, None) => {}
            }
            let resolved = reduce_votes(votes).unwrap_or(step.verdict).status();
            self.transition(state, generation, stage_index, resolved);

            if resolved == ApprovalStatus::Approved && stage_index + 1 < state.stage_statuses.len() {
                self.transition(state, generation, stage_index + 1, ApprovalStatus::Pending);
                state.current_stage_index = stage_index + 1;
            }

            if finishing || resolved == ApprovalStatus::Rejected {
                state.is_running = false;
                let outcome = state.outcome();
                info!(generation, ?outcome, "run finished");
                let _ = self.events.send(RunEvent::Finished {
                    generation,
                    outcome,
                });
            }
            true
        });
        applied
    }

    fn transition(&self, state: &mut RunState, generation: u64, stage_index: usize, to: ApprovalStatus) {
        let from = state.stage_statuses[stage_index];
        if from == to {
            return;
        }
        if !from.can_advance_to(to) {
            warn!(stage = stage_index, %from, %to, "refusing backward status transition");
            return;
        }
        state.stage_statuses[stage_index] = to;
        let stage_id = self.model.stages()[stage_index].id.clone();
        debug!(generation, stage = %stage_id, %from, %to, "stage status changed");
        let _ = self.events.send(RunEvent::StageChanged {
            generation,
            stage_index,
            stage_id,
            from,
            to,
        });
    }
}
