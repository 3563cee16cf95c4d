//! Error types shared by every provisioning operation

use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Can't find {} directory. Have you tried -l option to set laradock root folder?", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Can't find {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(
        "Invalid project name '{0}': only letters, digits, '_' and '-' are allowed"
    )]
    InvalidProjectName(String),

    #[error("Step '{step}' failed ({status})")]
    CommandFailed { step: String, status: ExitStatus },

    #[error("Failed to execute {program}. Make sure it is installed and on PATH")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to update {} with elevated privileges: {reason}", .path.display())]
    PrivilegedEditFailure { path: PathBuf, reason: String },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse configuration {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ProvisionError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProvisionError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
