use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "approval-flow")]
#[command(version, about = "Scripted partner-onboarding approval workflow")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Multiplier applied to every phase delay. Overrides flow.toml and APPROVAL_FLOW_TIME_SCALE.
    #[arg(long, global = true)]
    pub time_scale: Option<f64>,

    /// Log output format: text, json
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stages and scenarios
    List,
    /// Play one scenario to completion
    Play {
        /// Scenario id (defaults to the success scenario)
        #[arg(short, long)]
        scenario: Option<String>,

        /// UI output mode: full, minimal, json
        #[arg(long, default_value = "full")]
        ui: String,
    },
    /// Initialize a new approval-flow project
    Init,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate flow.toml and the workflow definition
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_format = cli.log_format.parse()?;
    approval_flow::telemetry::init_logging(cli.verbose, log_format);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::List => cmd::cmd_list(&cli, &project_dir)?,
        Commands::Play { scenario, ui } => {
            cmd::cmd_play(&cli, &project_dir, scenario.as_deref(), ui).await?;
        }
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Config { command } => cmd::cmd_config(&cli, &project_dir, command.clone())?,
    }

    Ok(())
}
