//! External process execution
//!
//! Every process the tool spawns goes through [`CommandRunner`], so exit
//! statuses are inspected in one place and tests can record invocations
//! instead of running them.

use std::{
    fmt,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use colored::Colorize;

use crate::error::{ProvisionError, Result};

/// A fully assembled external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Piped to the child's stdin when set; stdout is then discarded
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
            stdin: None,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

pub trait CommandRunner {
    /// Run `invocation` to completion. `step` names the operation in errors.
    fn run(&self, step: &str, invocation: &Invocation) -> Result<()>;
}

/// Runs commands on the host, inheriting the terminal
pub struct SystemRunner {
    pub verbose: bool,
}

impl CommandRunner for SystemRunner {
    fn run(&self, step: &str, invocation: &Invocation) -> Result<()> {
        if self.verbose {
            println!("{}", format!("$ {}", invocation).bright_black());
        }

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let spawn_error = |source| ProvisionError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let status = match &invocation.stdin {
            None => command.status().map_err(spawn_error)?,
            Some(input) => {
                let mut child = command
                    .stdin(Stdio::piped())
                    .stdout(Stdio::null())
                    .spawn()
                    .map_err(spawn_error)?;

                if let Some(mut stdin) = child.stdin.take() {
                    if let Err(e) = stdin.write_all(input.as_bytes()) {
                        drop(stdin);
                        // Reap the child before reporting; it may already have exited
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ProvisionError::io(&invocation.program, e));
                    }
                    // Close stdin to signal EOF
                    drop(stdin);
                }

                child
                    .wait()
                    .map_err(|e| ProvisionError::io(&invocation.program, e))?
            }
        };

        if !status.success() {
            return Err(ProvisionError::CommandFailed {
                step: step.to_string(),
                status,
            });
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let invocation = Invocation::new("docker-compose", ["restart", "nginx", "mysql"]);
        assert_eq!(invocation.to_string(), "docker-compose restart nginx mysql");

        let invocation = Invocation::new("bash", ["-c", "cd demo && npm install"]);
        assert_eq!(invocation.to_string(), "bash -c 'cd demo && npm install'");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failing_step() {
        let runner = SystemRunner { verbose: false };

        runner
            .run("true", &Invocation::new("sh", ["-c", "exit 0"]))
            .unwrap();

        let err = runner
            .run("exit three", &Invocation::new("sh", ["-c", "exit 3"]))
            .unwrap_err();
        match err {
            ProvisionError::CommandFailed { step, status } => {
                assert_eq!(step, "exit three");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_pipes_stdin() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let runner = SystemRunner { verbose: false };

        runner
            .run(
                "tee",
                &Invocation::new("tee", [target.to_string_lossy().to_string()])
                    .stdin("127.0.0.1 demo.test\n"),
            )
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "127.0.0.1 demo.test\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_stdin_closed_early() {
        let runner = SystemRunner { verbose: false };
        // Child exits without reading; a large payload hits a broken pipe
        let payload = "x".repeat(4 * 1024 * 1024);

        let result = runner.run(
            "early exit",
            &Invocation::new("sh", ["-c", "exec 0<&-; exit 0"]).stdin(payload),
        );

        assert!(matches!(
            result,
            Ok(()) | Err(ProvisionError::Io { .. })
        ));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner { verbose: false };
        let err = runner
            .run("nope", &Invocation::new("definitely-not-a-real-binary-xyz", ["x"]))
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Spawn { .. }));
    }
}
