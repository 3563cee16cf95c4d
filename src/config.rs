use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::error::ProvisionError;

/// Name of the key holding the MySQL admin password in the stack's `.env`
pub const ROOT_PASSWORD_KEY: &str = "MYSQL_ROOT_PASSWORD";

/// Get the configuration directory path
/// Checks LARADOCK_PROJECTS_DIR environment variable first,
/// then defaults to ~/.laradock-projects
pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(custom_dir) = env::var("LARADOCK_PROJECTS_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    let home_dir = dirs::home_dir().context("Failed to get home directory")?;

    Ok(home_dir.join(".laradock-projects"))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub stack: StackSettings,
    pub database: DatabaseSettings,
    pub hosts: HostsSettings,
    pub setup: SetupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Laradock root directory, relative to the working directory
    pub root: String,
    /// Orchestrator invocation, e.g. ["docker-compose"] or ["docker", "compose"]
    pub compose_command: Vec<String>,
    pub web_service: String,
    pub database_service: String,
    pub workspace_service: String,
    pub workspace_user: String,
    /// Directory holding nginx vhosts, relative to the stack root
    pub sites_dir: String,
    pub vhost_template: String,
    /// Identifier in the template replaced by the project name
    pub vhost_placeholder: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            root: "laradock".to_string(),
            compose_command: vec!["docker-compose".to_string()],
            web_service: "nginx".to_string(),
            database_service: "mysql".to_string(),
            workspace_service: "workspace".to_string(),
            workspace_user: "laradock".to_string(),
            sites_dir: "nginx/sites".to_string(),
            vhost_template: "laravel.conf.example".to_string(),
            vhost_placeholder: "laravel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// DB_HOST written into project env files
    pub host: String,
    /// Used when the stack's .env does not provide MYSQL_ROOT_PASSWORD
    pub default_root_password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "mysql".to_string(),
            default_root_password: "root".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostsSettings {
    pub path: PathBuf,
    pub address: String,
    pub tld: String,
    pub keep_backups: usize,
}

impl Default for HostsSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/hosts"),
            address: "127.0.0.1".to_string(),
            tld: "test".to_string(),
            keep_backups: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    /// Commands run in order inside the workspace container
    pub steps: Vec<String>,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            steps: [
                "composer install --prefer-dist --no-interaction --no-suggest",
                "php artisan migrate:fresh --seed",
                "php artisan key:generate",
                "npm install",
                "npm run production",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Settings {
    /// Domain served for a project, e.g. `demo.test`
    pub fn domain(&self, project: &str) -> String {
        format!("{}.{}", project, self.hosts.tld)
    }

    pub fn app_url(&self, project: &str) -> String {
        format!("http://{}", self.domain(project))
    }
}

/// Load settings from `<config_dir>/config.toml`, falling back to defaults
/// when the file does not exist. The file is never created implicitly.
pub fn load_settings(config_dir: &Path) -> std::result::Result<Settings, ProvisionError> {
    let path = config_dir.join("config.toml");

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(ProvisionError::io(&path, e)),
    };

    toml::from_str(&content).map_err(|source| ProvisionError::Config { path, source })
}

/// Where the admin password came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    EnvFile,
    FileAbsent,
    KeyAbsent,
    /// The MYSQL_ROOT_PASSWORD line (or the file) could not be read;
    /// carries the reason
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct RootPassword {
    pub value: String,
    pub source: CredentialSource,
}

/// Whether a .env line assigns MYSQL_ROOT_PASSWORD
fn assigns_root_password(line: &str) -> bool {
    let line = line.trim_start();
    let line = line
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(line);

    match line.strip_prefix(ROOT_PASSWORD_KEY) {
        Some(rest) => rest.is_empty() || rest.starts_with(['=', ' ', '\t']),
        None => false,
    }
}

/// Read MYSQL_ROOT_PASSWORD from the stack's .env without touching the
/// process environment. Values are taken literally (`$VAR` is not
/// expanded) and lines assigning other keys are never parsed, so a broken
/// line elsewhere in the file cannot hide the password.
pub fn load_root_password(env_path: &Path, fallback: &str) -> RootPassword {
    let default = |source| RootPassword {
        value: fallback.to_string(),
        source,
    };

    let content = match fs::read_to_string(env_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return default(CredentialSource::FileAbsent);
        }
        Err(e) => return default(CredentialSource::Malformed(e.to_string())),
    };

    let mut found = None;
    let mut parse_error = None;

    for line in content.lines().filter(|line| assigns_root_password(line)) {
        match dotenv_parser::parse_dotenv(&format!("{}\n", line)) {
            Ok(mut pairs) => match pairs.remove(ROOT_PASSWORD_KEY) {
                Some(value) => found = Some(value),
                None => parse_error = Some(format!("no value in '{}'", line.trim())),
            },
            Err(e) => parse_error = Some(e.to_string()),
        }
    }

    match (found, parse_error) {
        (Some(value), _) => RootPassword {
            value,
            source: CredentialSource::EnvFile,
        },
        (None, Some(e)) => default(CredentialSource::Malformed(e)),
        (None, None) => default(CredentialSource::KeyAbsent),
    }
}
