//! Configuration view and validation commands for `approval-flow config`.

use anyhow::Result;

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(
    cli: &Cli,
    project_dir: &std::path::Path,
    command: Option<ConfigCommands>,
) -> Result<()> {
    use approval_flow::flow_config::FlowConfig;

    let config = FlowConfig::with_cli_args(project_dir.to_path_buf(), cli.time_scale)?;
    let config_path = config.config_path();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Approval Flow Configuration");
            println!("===========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No flow.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            match config.definition_path() {
                Some(path) => println!("  workflow.definition = \"{}\"", path.display()),
                None => println!("  workflow.definition = (built-in)"),
            }
            let model = config.load_model()?;
            let pacing = config.pacing(&model)?;
            println!("  timing.scale = {}", pacing.scale());
            println!();
            println!("Effective pacing (scaled):");
            for (index, stage) in model.stages().iter().enumerate() {
                let delays = pacing.stage(index);
                if stage.can_reject {
                    println!(
                        "  {:<22} approve {}ms, reject {}ms",
                        stage.id,
                        delays.approve_after.as_millis(),
                        delays.reject_after.as_millis()
                    );
                } else {
                    println!(
                        "  {:<22} approve {}ms",
                        stage.id,
                        delays.approve_after.as_millis()
                    );
                }
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
                println!();
            } else {
                for warning in &warnings {
                    println!("  - {}", warning);
                }
                println!();
                anyhow::bail!("Configuration has {} problem(s)", warnings.len());
            }
        }
    }

    Ok(())
}
