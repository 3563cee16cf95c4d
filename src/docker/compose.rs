//! Docker Compose integration
//!
//! Builds orchestrator invocations against the Laradock stack and inspects
//! the stack's docker-compose.yml for the services an operation relies on.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use serde_yaml::Value;

use super::runner::{CommandRunner, Invocation};
use crate::config::StackSettings;

/// Services declared in a docker-compose.yml file
#[derive(Debug, Clone, Default)]
pub struct ComposeInfo {
    pub services: BTreeSet<String>,
}

impl ComposeInfo {
    /// Parse a docker-compose.yml file
    pub fn parse(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read docker-compose file: {:?}", path))?;

        let yaml: Value =
            serde_yaml::from_str(&content).context("Failed to parse docker-compose YAML")?;

        let mut services = BTreeSet::new();

        if let Some(services_map) = yaml.get("services").and_then(|v| v.as_mapping()) {
            for (service_name, _) in services_map {
                let name = service_name
                    .as_str()
                    .context("Service name is not a string")?;
                services.insert(name.to_string());
            }
        }

        Ok(Self { services })
    }

    /// Names from `required` that the file does not declare
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|name| !self.services.contains(**name))
            .copied()
            .collect()
    }
}

/// Warn about services the stack does not define. Never fails: the
/// orchestrator itself reports the authoritative error.
pub fn warn_missing_services(root: &Path, required: &[&str]) {
    let compose_path = root.join("docker-compose.yml");

    if !compose_path.exists() {
        println!(
            "{} No docker-compose.yml found in {}",
            "⚠".yellow(),
            root.display()
        );
        return;
    }

    match ComposeInfo::parse(&compose_path) {
        Ok(info) => {
            for service in info.missing(required) {
                println!(
                    "{} Service {} is not defined in {}",
                    "⚠".yellow(),
                    service.bright_white(),
                    compose_path.display()
                );
            }
        }
        Err(e) => {
            println!("{} Warning: {:#}", "⚠".yellow(), e);
        }
    }
}

/// Orchestrator commands run from the stack root
pub struct Compose<'a> {
    settings: &'a StackSettings,
    root: PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> Compose<'a> {
    pub fn new(settings: &'a StackSettings, root: PathBuf, runner: &'a dyn CommandRunner) -> Self {
        Self {
            settings,
            root,
            runner,
        }
    }

    fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (program, prefix) = match self.settings.compose_command.split_first() {
            Some((program, prefix)) => (program.clone(), prefix.to_vec()),
            None => ("docker-compose".to_string(), Vec::new()),
        };

        let mut all_args = prefix;
        all_args.extend(args.into_iter().map(Into::into));

        Invocation::new(program, all_args).current_dir(&self.root)
    }

    /// Web and database services, the pair every operation touches
    fn core_services(&self) -> [String; 2] {
        [
            self.settings.web_service.clone(),
            self.settings.database_service.clone(),
        ]
    }

    /// Restart web and database so nginx picks up new vhosts
    pub fn restart_core(&self) -> crate::error::Result<()> {
        let mut args = vec!["restart".to_string()];
        args.extend(self.core_services());
        self.runner
            .run("restart services", &self.invocation(args))
    }

    /// Start web and database in the background
    pub fn up_core(&self) -> crate::error::Result<()> {
        let mut args = vec!["up".to_string(), "-d".to_string()];
        args.extend(self.core_services());
        self.runner.run("start services", &self.invocation(args))
    }

    /// `exec -T` inside a service, optionally as a specific user
    pub fn exec(
        &self,
        step: &str,
        service: &str,
        user: Option<&str>,
        command: &[String],
    ) -> crate::error::Result<()> {
        let mut args = vec!["exec".to_string(), "-T".to_string()];
        if let Some(user) = user {
            args.push(format!("--user={}", user));
        }
        args.push(service.to_string());
        args.extend(command.iter().cloned());

        self.runner.run(step, &self.invocation(args))
    }
}
