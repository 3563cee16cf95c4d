//! CLI command definitions for ldp
//!
//! This module contains all the clap-based command definitions and argument parsing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ldp")]
#[command(about = "Provision Laravel projects on a Laradock stack", long_about = None)]
pub struct Cli {
    /// Set Laradock installation directory name instead of default one `laradock`
    #[arg(short = 'l', long = "laradock", value_name = "PATH", global = true)]
    pub laradock: Option<String>,

    /// Print every external command before running it
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create vhost, databases and /etc/hosts entry for a project
    New {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Remove vhost, databases and /etc/hosts entry of a project
    Rm {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Write .env files and run setup steps inside the workspace container
    Init {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Reconcile existing project directories (not implemented yet)
    Discover,
}
