//! MySQL databases and users for a project
//!
//! Each project gets `<name>` and `<name>_test`, both with a user of the
//! same name whose password equals the name. Statements run through the
//! mysql client inside the database container.

use crate::{docker::compose::Compose, error::Result};

/// Database/user names provisioned for a project
pub fn database_names(project: &str) -> [String; 2] {
    [project.to_string(), format!("{}_test", project)]
}

pub fn create_statements(name: &str) -> String {
    format!(
        "CREATE DATABASE `{name}`; GRANT ALL PRIVILEGES ON `{name}`.* TO '{name}'@'%' IDENTIFIED BY '{name}';"
    )
}

pub fn drop_statements(name: &str) -> String {
    format!("DROP DATABASE `{name}`; DROP USER '{name}'@'%';")
}

fn mysql_command(root_password: &str, sql: String) -> Vec<String> {
    vec![
        "mysql".to_string(),
        "-u".to_string(),
        "root".to_string(),
        format!("-p{}", root_password),
        format!("--execute={}", sql),
    ]
}

pub struct Database<'a> {
    pub compose: &'a Compose<'a>,
    pub service: &'a str,
    pub root_password: &'a str,
}

impl Database<'_> {
    pub fn create(&self, name: &str) -> Result<()> {
        self.compose.exec(
            &format!("create database {}", name),
            self.service,
            None,
            &mysql_command(self.root_password, create_statements(name)),
        )
    }

    pub fn drop(&self, name: &str) -> Result<()> {
        self.compose.exec(
            &format!("drop database {}", name),
            self.service,
            None,
            &mysql_command(self.root_password, drop_statements(name)),
        )
    }
}
