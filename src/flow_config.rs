//! Layered configuration for the approval flow.
//!
//! Settings are read from `.approval-flow/flow.toml` and merged with the
//! environment and CLI (file → environment → CLI).
//!
//! # Configuration File Format
//!
//! ```toml
//! [workflow]
//! definition = "workflow.toml"
//!
//! [timing]
//! scale = 1.0
//!
//! [pacing.commercial-approval]
//! approve_after_ms = 5000
//! reject_after_ms = 3000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::init::FLOW_DIR;
use crate::sequencer::Pacing;
use crate::workflow::{WorkflowDefinition, WorkflowModel};

/// Environment variable overriding `timing.scale`.
pub const TIME_SCALE_ENV: &str = "APPROVAL_FLOW_TIME_SCALE";

/// Where the stage and scenario tables come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSection {
    /// Definition file, relative to `.approval-flow/`. Built-in when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Global timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSection {
    /// Multiplier applied to every delay
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

/// Delay overrides for one stage, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PacingOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve_after_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_after_ms: Option<u64>,
}

/// The complete flow.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlowToml {
    #[serde(default)]
    pub workflow: WorkflowSection,
    #[serde(default)]
    pub timing: TimingSection,
    /// Per-stage overrides keyed by stage id
    #[serde(default)]
    pub pacing: BTreeMap<String, PacingOverride>,
}

impl FlowToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse flow.toml")
    }

    /// Load `flow.toml` from `flow_dir`, or defaults if absent.
    pub fn load_or_default(flow_dir: &Path) -> Result<Self> {
        let config_path = flow_dir.join("flow.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize flow.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Time scale, with the environment overriding the file.
    pub fn time_scale(&self) -> f64 {
        std::env::var(TIME_SCALE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(self.timing.scale)
    }
}

/// Unified configuration: flow.toml plus environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub project_dir: PathBuf,
    pub flow_dir: PathBuf,
    pub toml: FlowToml,
    /// CLI override for the time scale
    pub cli_time_scale: Option<f64>,
}

impl FlowConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let flow_dir = project_dir.join(FLOW_DIR);
        let toml = FlowToml::load_or_default(&flow_dir)?;

        Ok(Self {
            project_dir,
            flow_dir,
            toml,
            cli_time_scale: None,
        })
    }

    pub fn with_cli_args(project_dir: PathBuf, time_scale: Option<f64>) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.cli_time_scale = time_scale;
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.flow_dir.join("flow.toml")
    }

    /// Time scale (CLI → env → file → 1.0).
    pub fn time_scale(&self) -> f64 {
        self.cli_time_scale
            .unwrap_or_else(|| self.toml.time_scale())
    }

    /// Path of the configured workflow definition, if any.
    pub fn definition_path(&self) -> Option<PathBuf> {
        self.toml
            .workflow
            .definition
            .as_ref()
            .map(|file| self.flow_dir.join(file))
    }

    /// Load and validate the workflow model.
    pub fn load_model(&self) -> Result<WorkflowModel> {
        let definition = match self.definition_path() {
            Some(path) => WorkflowDefinition::load(&path)?,
            None => WorkflowDefinition::builtin(),
        };
        let model = definition
            .into_model()
            .context("Invalid workflow definition")?;
        Ok(model)
    }

    /// Build pacing for `model` from built-in delays, overrides and scale.
    pub fn pacing(&self, model: &WorkflowModel) -> Result<Pacing> {
        let mut pacing = Pacing::for_model(model);
        for (stage_id, entry) in &self.toml.pacing {
            pacing
                .override_stage(
                    stage_id,
                    entry.approve_after_ms.map(Duration::from_millis),
                    entry.reject_after_ms.map(Duration::from_millis),
                )
                .context("Invalid pacing configuration")?;
        }
        let pacing = pacing
            .with_scale(self.time_scale())
            .context("Invalid timing configuration")?;
        Ok(pacing)
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Ok(raw) = std::env::var(TIME_SCALE_ENV)
            && raw.trim().parse::<f64>().is_err()
        {
            warnings.push(format!(
                "Ignoring {}='{}': not a number, using timing.scale from flow.toml",
                TIME_SCALE_ENV, raw
            ));
        }

        let scale = self.time_scale();
        if !scale.is_finite() || scale <= 0.0 {
            warnings.push(format!(
                "Invalid time scale {}: must be a finite number greater than zero",
                scale
            ));
        }

        if let Some(path) = self.definition_path()
            && !path.exists()
        {
            warnings.push(format!(
                "Workflow definition not found: {}",
                path.display()
            ));
            return warnings;
        }

        match self.load_model() {
            Ok(model) => {
                for stage_id in self.toml.pacing.keys() {
                    if !model.stages().iter().any(|s| &s.id == stage_id) {
                        warnings.push(format!(
                            "Pacing override for unknown stage '{}'",
                            stage_id
                        ));
                    }
                }
                if let Err(e) = self.pacing(&model)
                    && let Some(err @ ConfigError::PacingOverflow { .. }) =
                        e.downcast_ref::<ConfigError>()
                {
                    warnings.push(err.to_string());
                }
            }
            Err(e) => warnings.push(format!("{:#}", e)),
        }

        warnings
    }
}
