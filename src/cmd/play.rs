//! Scenario playback for `approval-flow play`.

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::super::Cli;

pub async fn cmd_play(
    cli: &Cli,
    project_dir: &std::path::Path,
    scenario: Option<&str>,
    ui: &str,
) -> Result<()> {
    use approval_flow::flow_config::FlowConfig;
    use approval_flow::sequencer::{RunEvent, Sequencer, StartOutcome};
    use approval_flow::ui::{FlowUI, UiMode};

    let config = FlowConfig::with_cli_args(project_dir.to_path_buf(), cli.time_scale)?;
    for warning in config.validate() {
        warn!("{}", warning);
    }
    let model = config.load_model()?;
    let pacing = config.pacing(&model)?;
    let sequencer = Sequencer::new(model, pacing);

    if let Some(id) = scenario {
        sequencer
            .select_scenario(id)
            .context("Cannot select scenario")?;
    }

    let ui = FlowUI::new(sequencer.model(), UiMode::parse(ui), cli.verbose);
    let mut events = sequencer.events();

    let StartOutcome::Started { generation } = sequencer
        .start_selected()
        .context("Cannot start scenario")?
    else {
        anyhow::bail!("A run is already in progress");
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if !event.concerns(generation) => continue,
                Ok(event) => {
                    ui.handle_event(&event);
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                info!("interrupted, resetting run");
                sequencer.reset();
                ui.handle_event(&RunEvent::Reset {
                    generation: sequencer.snapshot().generation,
                });
                break;
            }
        }
    }

    ui.finish(&sequencer.snapshot());
    Ok(())
}
