//! Project scaffolding for `approval-flow init`.
//!
//! Creates the `.approval-flow/` directory in a project:
//!
//! ```text
//! .approval-flow/
//! ├── flow.toml        # Timing and pacing configuration
//! └── workflow.toml    # Stage and scenario tables (built-in flow)
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::workflow::WorkflowDefinition;

/// The name of the approval flow configuration directory.
pub const FLOW_DIR: &str = ".approval-flow";

const DEFAULT_FLOW_TOML: &str = r#"# approval-flow configuration

[workflow]
# Stage and scenario tables, relative to this directory.
definition = "workflow.toml"

[timing]
# Multiplier applied to every delay (1.0 = demo pacing).
scale = 1.0

[pacing.partner-creation]
approve_after_ms = 4000

[pacing.commercial-approval]
approve_after_ms = 5000
reject_after_ms = 3000

[pacing.parallel-approval]
approve_after_ms = 6000
reject_after_ms = 4000

[pacing.ready-activation]
approve_after_ms = 4000
"#;

/// Result of initializing a project.
#[derive(Debug)]
pub struct InitResult {
    /// Path to the `.approval-flow` directory
    pub flow_dir: PathBuf,
    /// Files written by this call (existing files are left alone)
    pub written: Vec<PathBuf>,
}

impl InitResult {
    /// Whether anything new was written.
    pub fn created(&self) -> bool {
        !self.written.is_empty()
    }
}

/// Initialize `.approval-flow/` in `project_dir`. Idempotent: existing files
/// are never overwritten.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let flow_dir = get_flow_dir(project_dir);
    std::fs::create_dir_all(&flow_dir)
        .with_context(|| format!("Failed to create directory: {}", flow_dir.display()))?;

    let mut written = Vec::new();

    let config_file = flow_dir.join("flow.toml");
    if !config_file.exists() {
        std::fs::write(&config_file, DEFAULT_FLOW_TOML)
            .with_context(|| format!("Failed to create flow.toml: {}", config_file.display()))?;
        written.push(config_file);
    }

    let workflow_file = flow_dir.join("workflow.toml");
    if !workflow_file.exists() {
        WorkflowDefinition::builtin().save(&workflow_file)?;
        written.push(workflow_file);
    }

    Ok(InitResult { flow_dir, written })
}

/// Get the path to the `.approval-flow` directory for a project.
pub fn get_flow_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(FLOW_DIR)
}
