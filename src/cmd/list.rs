//! Stage and scenario listing for `approval-flow list`.

use anyhow::Result;
use console::style;

use super::super::Cli;

pub fn cmd_list(cli: &Cli, project_dir: &std::path::Path) -> Result<()> {
    use approval_flow::flow_config::FlowConfig;
    use approval_flow::ui::icons::PARALLEL;

    let config = FlowConfig::with_cli_args(project_dir.to_path_buf(), cli.time_scale)?;
    let model = config.load_model()?;
    let pacing = config.pacing(&model)?;

    println!();
    println!("{}", style("Stages").bold());
    println!(
        "{:<4} {:<24} {:<10} {:<10} Reviewers",
        "#", "Title", "Approve", "Reject"
    );
    println!(
        "{:<4} {:<24} {:<10} {:<10} ---------",
        "--", "-----", "-------", "------"
    );
    for (index, stage) in model.stages().iter().enumerate() {
        let delays = pacing.stage(index);
        let reject = if stage.can_reject {
            format!("{}ms", delays.reject_after.as_millis())
        } else {
            "-".to_string()
        };
        let reviewers: Vec<String> = stage
            .participants
            .iter()
            .map(|p| format!("{} ({})", p.name, p.role))
            .collect();
        let marker = if stage.parallel {
            PARALLEL.to_string()
        } else {
            String::new()
        };
        println!(
            "{:<4} {:<24} {:<10} {:<10} {}{}",
            index + 1,
            stage.title,
            format!("{}ms", delays.approve_after.as_millis()),
            reject,
            marker,
            reviewers.join(", ")
        );
    }

    println!();
    println!("{}", style("Scenarios").bold());
    for scenario in model.scenarios() {
        let title = if scenario.is_success() {
            style(&scenario.title).green()
        } else {
            style(&scenario.title).red()
        };
        println!("  {:<20} {}", style(&scenario.id).cyan(), title);
        if !scenario.description.is_empty() {
            println!("  {:<20} {}", "", style(&scenario.description).dim());
        }
        if let (Some(by), Some(at)) = (
            model.rejected_by(&scenario.id),
            model.rejected_at(&scenario.id),
        ) {
            println!("  {:<20} Rejected by: {} at {}", "", by.name, at.title);
        }
    }
    println!();

    Ok(())
}
