//! /etc/hosts file management
//!
//! This module handles adding and removing the `<project>.test` entry
//! for local development domains with backup support.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Local;
use colored::Colorize;

use crate::{
    docker::runner::{CommandRunner, Invocation},
    error::{ProvisionError, Result},
};

/// Program used to gain write access to the hosts file
const ELEVATION_PROGRAM: &str = "sudo";

/// Hostnames on a hosts line, ignoring the address and trailing comment
fn hostnames(line: &str) -> Vec<&str> {
    let without_comment = line.split('#').next().unwrap_or("");
    without_comment.split_whitespace().skip(1).collect()
}

/// Whether any line already maps `domain` to `address`
fn has_entry(content: &str, address: &str, domain: &str) -> bool {
    content.lines().any(|line| {
        let mut parts = line.split('#').next().unwrap_or("").split_whitespace();
        parts.next() == Some(address) && parts.any(|host| host == domain)
    })
}

/// Append `<address> <domain>` unless an identical mapping exists.
/// Returns `None` when no change is needed.
pub fn append_entry(content: &str, address: &str, domain: &str) -> Option<String> {
    if has_entry(content, address, domain) {
        return None;
    }

    let mut result = content.to_string();
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(&format!("{} {}\n", address, domain));

    Some(result)
}

/// Remove `domain` from every line that maps it. The hostname must match
/// exactly, so removing `demo.test` leaves `mydemo.test` alone. Lines left
/// without hostnames are dropped; other lines are kept verbatim.
pub fn remove_entry(content: &str, domain: &str) -> (String, usize) {
    let mut result = String::with_capacity(content.len());
    let mut removed = 0;

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            continue;
        }

        let hosts = hostnames(body);
        if !hosts.contains(&domain) {
            result.push_str(line);
            continue;
        }

        removed += 1;
        let remaining: Vec<&str> = hosts.into_iter().filter(|h| *h != domain).collect();
        if remaining.is_empty() {
            continue;
        }

        let address = trimmed.split_whitespace().next().unwrap_or_default();
        result.push_str(&format!("{} {}", address, remaining.join(" ")));
        if let Some(comment) = body.split_once('#').map(|(_, c)| c) {
            result.push_str(&format!(" #{}", comment));
        }
        result.push_str(&line[body.len()..]);
    }

    (result, removed)
}

/// Edits the hosts file, escalating through sudo when a direct write is
/// not permitted
pub struct HostsEditor<'a> {
    pub path: PathBuf,
    /// Backups are skipped when unset
    pub backup_dir: Option<PathBuf>,
    pub keep_backups: usize,
    pub runner: &'a dyn CommandRunner,
}

impl HostsEditor<'_> {
    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ProvisionError::io(&self.path, e)),
        }
    }

    /// Map `domain` to `address`
    pub fn add(&self, address: &str, domain: &str) -> Result<()> {
        let content = self.read()?;

        let Some(new_content) = append_entry(&content, address, domain) else {
            println!(
                "{} {} already up to date for {}",
                "✓".green(),
                self.path.display(),
                domain.bright_white()
            );
            return Ok(());
        };

        self.backup(&content);
        self.write(&new_content)?;

        println!(
            "{} Added {} {} to {}",
            "✓".green(),
            address,
            domain.bright_white(),
            self.path.display()
        );

        Ok(())
    }

    /// Remove every mapping of `domain`
    pub fn remove(&self, domain: &str) -> Result<()> {
        let content = self.read()?;
        let (new_content, removed) = remove_entry(&content, domain);

        if removed == 0 {
            println!(
                "{} No entries found for {}",
                "ℹ".blue(),
                domain.bright_white()
            );
            return Ok(());
        }

        self.backup(&content);
        self.write(&new_content)?;

        println!(
            "{} Removed {} from {}",
            "✓".green(),
            domain.bright_white(),
            self.path.display()
        );

        Ok(())
    }

    /// Best effort: a failed backup only prints a warning
    fn backup(&self, content: &str) {
        let Some(backup_dir) = &self.backup_dir else {
            return;
        };

        match backup_hosts_content(backup_dir, content, self.keep_backups) {
            Ok(backup_path) => {
                println!("{} Backup created: {}", "✓".green(), backup_path.display());
            }
            Err(e) => {
                println!("{} Warning: Could not create backup: {}", "⚠".yellow(), e);
            }
        }
    }

    /// Write content to the hosts file, using sudo if necessary
    fn write(&self, content: &str) -> Result<()> {
        // Try to write directly first
        if fs::write(&self.path, content).is_ok() {
            return Ok(());
        }

        println!(
            "{} Updating {}. Need root permissions...",
            "ℹ".blue(),
            self.path.display()
        );

        let invocation = Invocation::new(
            ELEVATION_PROGRAM,
            ["tee".to_string(), self.path.to_string_lossy().to_string()],
        )
        .stdin(content);

        self.runner
            .run("update hosts file", &invocation)
            .map_err(|e| ProvisionError::PrivilegedEditFailure {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

/// Create a timestamped backup in `backup_dir`
fn backup_hosts_content(backup_dir: &Path, content: &str, keep_count: usize) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir).map_err(|e| ProvisionError::io(backup_dir, e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("hosts_{}.bak", timestamp));

    fs::write(&backup_path, content).map_err(|e| ProvisionError::io(&backup_path, e))?;

    cleanup_old_backups(backup_dir, keep_count)?;

    Ok(backup_path)
}

/// Remove old backups, keeping only the most recent `keep_count`
fn cleanup_old_backups(backup_dir: &Path, keep_count: usize) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(backup_dir)
        .map_err(|e| ProvisionError::io(backup_dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "bak")
                .unwrap_or(false)
        })
        .collect();

    // Timestamped names sort chronologically; newest first
    entries.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

    for entry in entries.into_iter().skip(keep_count) {
        let _ = fs::remove_file(entry.path());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::docker::runner::testing::RecordingRunner;

    const HOSTS: &str = "127.0.0.1 localhost\n::1 localhost\n127.0.0.1 mydemo.test\n";

    #[test]
    fn test_append_entry() {
        let result = append_entry(HOSTS, "127.0.0.1", "demo.test").unwrap();
        assert_eq!(
            result,
            "127.0.0.1 localhost\n::1 localhost\n127.0.0.1 mydemo.test\n127.0.0.1 demo.test\n"
        );
    }

    #[test]
    fn test_append_entry_without_trailing_newline() {
        let result = append_entry("127.0.0.1 localhost", "127.0.0.1", "demo.test").unwrap();
        assert_eq!(result, "127.0.0.1 localhost\n127.0.0.1 demo.test\n");
    }

    #[test]
    fn test_append_entry_already_present() {
        let content = "127.0.0.1   demo.test # added earlier\n";
        assert!(append_entry(content, "127.0.0.1", "demo.test").is_none());
        // A different project's entry does not count
        assert!(append_entry(HOSTS, "127.0.0.1", "demo.test").is_some());
    }

    #[test]
    fn test_remove_entry_is_line_anchored() {
        let content = "127.0.0.1 localhost\n127.0.0.1 mydemo.test\n127.0.0.1 demo.test\n127.0.0.1 demo.test.local\n";
        let (result, removed) = remove_entry(content, "demo.test");

        assert_eq!(removed, 1);
        assert_eq!(
            result,
            "127.0.0.1 localhost\n127.0.0.1 mydemo.test\n127.0.0.1 demo.test.local\n"
        );
    }

    #[test]
    fn test_remove_entry_keeps_other_hostnames_on_line() {
        let content = "127.0.0.1 demo.test other.test # shared\n# 127.0.0.1 demo.test\n";
        let (result, removed) = remove_entry(content, "demo.test");

        assert_eq!(removed, 1);
        assert_eq!(result, "127.0.0.1 other.test # shared\n# 127.0.0.1 demo.test\n");
    }

    #[test]
    fn test_remove_entry_absent() {
        let (result, removed) = remove_entry(HOSTS, "demo.test");
        assert_eq!(removed, 0);
        assert_eq!(result, HOSTS);
    }

    #[test]
    fn test_editor_add_and_remove_with_backup() {
        let dir = TempDir::new().unwrap();
        let hosts_path = dir.path().join("hosts");
        let backup_dir = dir.path().join("backups");
        fs::write(&hosts_path, HOSTS).unwrap();

        let runner = RecordingRunner::default();
        let editor = HostsEditor {
            path: hosts_path.clone(),
            backup_dir: Some(backup_dir.clone()),
            keep_backups: 10,
            runner: &runner,
        };

        editor.add("127.0.0.1", "demo.test").unwrap();
        assert!(
            fs::read_to_string(&hosts_path)
                .unwrap()
                .ends_with("127.0.0.1 demo.test\n")
        );

        editor.remove("demo.test").unwrap();
        assert_eq!(fs::read_to_string(&hosts_path).unwrap(), HOSTS);

        // Writable file: no elevation needed
        assert!(runner.steps().is_empty());
        assert!(fs::read_dir(&backup_dir).unwrap().count() >= 1);
    }

    #[test]
    fn test_editor_reports_failed_elevated_write() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so the direct write fails
        let hosts_path = dir.path().join("missing").join("hosts");

        let runner = RecordingRunner::failing_on("hosts");
        let editor = HostsEditor {
            path: hosts_path.clone(),
            backup_dir: None,
            keep_backups: 10,
            runner: &runner,
        };

        let err = editor.add("127.0.0.1", "demo.test").unwrap_err();

        assert!(
            matches!(err, ProvisionError::PrivilegedEditFailure { ref path, .. } if *path == hosts_path)
        );

        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "sudo");
        assert_eq!(
            calls[0].args,
            vec!["tee".to_string(), hosts_path.to_string_lossy().to_string()]
        );
        assert_eq!(calls[0].stdin.as_deref(), Some("127.0.0.1 demo.test\n"));
    }

    #[test]
    fn test_cleanup_old_backups_keeps_newest() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("hosts_2024010{}_000000.bak", i)), "x").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        cleanup_old_backups(dir.path(), 2).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "hosts_20240103_000000.bak",
                "hosts_20240104_000000.bak",
                "notes.txt"
            ]
        );
    }
}
