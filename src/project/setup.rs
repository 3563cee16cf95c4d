//! Application setup inside the workspace container

use colored::Colorize;

use crate::{config::StackSettings, docker::compose::Compose, error::Result};

/// `bash -c` script for one step, run from the project directory
pub fn step_script(project: &str, step: &str) -> String {
    format!("cd {} && {}", project, step)
}

/// Run each step in order; the first failure stops the rest
pub fn run_steps(compose: &Compose, stack: &StackSettings, project: &str, steps: &[String]) -> Result<()> {
    for (idx, step) in steps.iter().enumerate() {
        println!(
            "{} [{}/{}] {}",
            "ℹ".blue(),
            idx + 1,
            steps.len(),
            step.bright_white()
        );

        compose.exec(
            &format!("setup step '{}'", step),
            &stack.workspace_service,
            Some(stack.workspace_user.as_str()),
            &[
                "bash".to_string(),
                "-c".to_string(),
                step_script(project, step),
            ],
        )?;
    }

    Ok(())
}
