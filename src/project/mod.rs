//! Project management module
//!
//! This module contains functionality for managing Laradock projects:
//! - Precondition checks and project name handling
//! - nginx vhost files
//! - MySQL databases and users
//! - Project env files
//! - Setup steps in the workspace container
//! - The new/rm/init/discover commands

pub mod commands;
pub mod database;
pub mod env_file;
pub mod preconditions;
pub mod setup;
pub mod vhost;

use std::path::PathBuf;

use crate::{
    config::Settings,
    docker::{compose::Compose, runner::CommandRunner},
    system::hosts::HostsEditor,
};

/// Everything an operation needs, resolved once at startup
pub struct Context<'a> {
    pub settings: Settings,
    /// Directory containing the stack root and the project directories
    pub base_dir: PathBuf,
    /// Where hosts file backups go; none disables backups
    pub backup_dir: Option<PathBuf>,
    pub runner: &'a dyn CommandRunner,
}

impl Context<'_> {
    pub fn root(&self) -> PathBuf {
        self.base_dir.join(&self.settings.stack.root)
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.base_dir.join(project)
    }

    pub fn compose(&self) -> Compose<'_> {
        Compose::new(&self.settings.stack, self.root(), self.runner)
    }

    pub fn hosts_editor(&self) -> HostsEditor<'_> {
        HostsEditor {
            path: self.settings.hosts.path.clone(),
            backup_dir: self.backup_dir.clone(),
            keep_backups: self.settings.hosts.keep_backups,
            runner: self.runner,
        }
    }
}
