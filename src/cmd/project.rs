//! Project setup for `approval-flow init`.

use anyhow::Result;
use std::path::Path;

pub fn cmd_init(project_dir: &Path) -> Result<()> {
    use approval_flow::init::init_project;

    let result = init_project(project_dir)?;

    println!();
    if result.created() {
        println!(
            "Initialized approval-flow project in {}",
            result.flow_dir.display()
        );
        for path in &result.written {
            println!("  created {}", path.display());
        }
    } else {
        println!(
            "Project already initialized at {}",
            result.flow_dir.display()
        );
    }
    println!();
    println!("Next: run 'approval-flow play --scenario <id>' to play a scenario.");
    println!();

    Ok(())
}
