//! laradock-projects (ldp) - per-project provisioning for a Laradock stack
//!
//! Creates and removes nginx vhosts, MySQL databases and /etc/hosts entries
//! for Laravel projects living next to a Laradock checkout, and initializes
//! their env files and dependencies inside the workspace container.

use std::{env, process};

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;

mod cli;
mod config;
mod docker;
mod error;
mod project;
mod system;

use cli::{Cli, Commands};
use docker::runner::SystemRunner;
use project::{Context, commands};

fn run(cli: Cli) -> Result<()> {
    let config_dir = config::get_config_dir()?;
    let mut settings = config::load_settings(&config_dir)?;

    if let Some(root) = cli.laradock {
        settings.stack.root = root;
    }

    let runner = SystemRunner {
        verbose: cli.verbose,
    };
    let ctx = Context {
        settings,
        base_dir: env::current_dir().context("Failed to get current directory")?,
        backup_dir: Some(config_dir.join("backups").join("hosts")),
        runner: &runner,
    };

    match cli.command {
        Commands::New { name } => commands::new(&ctx, &name)?,
        Commands::Rm { name } => commands::rm(&ctx, &name)?,
        Commands::Init { name } => commands::init(&ctx, &name)?,
        Commands::Discover => commands::discover(&ctx)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}{:#}", "FATAL: ".red(), e);
        process::exit(1);
    }
}
