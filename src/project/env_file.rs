//! Project env file generation
//!
//! Copies `.env.example` and rewrites selected `KEY=value` lines so the
//! application talks to the stack's database.

use std::{fs, path::Path};

use regex::{NoExpand, Regex};

use crate::{
    config::Settings,
    error::{ProvisionError, Result},
};

/// Ordered key/value replacements applied to an env file
pub type EnvOverrides = Vec<(String, String)>;

/// Copy `template` to `output`, then replace every `KEY=...` line for each
/// override. Keys the template does not contain are left out silently and
/// returned to the caller.
pub fn rewrite(template: &Path, output: &Path, overrides: &[(String, String)]) -> Result<Vec<String>> {
    if !template.is_file() {
        return Err(ProvisionError::FileNotFound(template.to_path_buf()));
    }

    fs::copy(template, output).map_err(|e| ProvisionError::io(output, e))?;

    let mut content = fs::read_to_string(output).map_err(|e| ProvisionError::io(output, e))?;
    let mut missing = Vec::new();

    for (key, value) in overrides {
        let pattern = format!(r"(?m)^{}=[^\r\n]*", regex::escape(key));
        let Ok(re) = Regex::new(&pattern) else {
            missing.push(key.clone());
            continue;
        };

        if !re.is_match(&content) {
            missing.push(key.clone());
            continue;
        }

        let line = format!("{}={}", key, value);
        content = re.replace_all(&content, NoExpand(&line)).into_owned();
    }

    fs::write(output, content).map_err(|e| ProvisionError::io(output, e))?;

    Ok(missing)
}

fn pairs(items: &[(&str, String)]) -> EnvOverrides {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Overrides for the project's `.env`
pub fn development_overrides(settings: &Settings, project: &str) -> EnvOverrides {
    pairs(&[
        ("DB_HOST", settings.database.host.clone()),
        ("DB_USERNAME", project.to_string()),
        ("DB_PASSWORD", project.to_string()),
        ("DB_DATABASE", project.to_string()),
        ("APP_URL", settings.app_url(project)),
    ])
}

/// Overrides for the project's `.env.testing`
pub fn testing_overrides(settings: &Settings, project: &str) -> EnvOverrides {
    let test_name = format!("{}_test", project);
    pairs(&[
        ("DB_HOST", settings.database.host.clone()),
        ("DB_USERNAME", test_name.clone()),
        ("DB_PASSWORD", test_name.clone()),
        ("DB_DATABASE", test_name),
        ("APP_ENV", "testing".to_string()),
        ("APP_URL", settings.app_url(project)),
    ])
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const EXAMPLE: &str = "APP_NAME=Laravel\nAPP_ENV=local\nAPP_URL=http://localhost\n\nDB_CONNECTION=mysql\nDB_HOST=127.0.0.1\nDB_PORT=3306\nDB_DATABASE=laravel\nDB_USERNAME=root\nDB_PASSWORD=\n";

    #[test]
    fn test_rewrite_replaces_listed_keys_only() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let output = dir.path().join(".env");
        fs::write(&template, EXAMPLE).unwrap();

        let missing = rewrite(
            &template,
            &output,
            &development_overrides(&Settings::default(), "demo"),
        )
        .unwrap();
        assert!(missing.is_empty());

        let result = fs::read_to_string(&output).unwrap();
        assert_eq!(
            result,
            "APP_NAME=Laravel\nAPP_ENV=local\nAPP_URL=http://demo.test\n\nDB_CONNECTION=mysql\nDB_HOST=mysql\nDB_PORT=3306\nDB_DATABASE=demo\nDB_USERNAME=demo\nDB_PASSWORD=demo\n"
        );
        // Template is untouched
        assert_eq!(fs::read_to_string(&template).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_rewrite_exact_key_match() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let output = dir.path().join(".env");
        fs::write(&template, "XDB_HOST=a\nDB_HOST_EXTRA=b\nDB_HOST=c\r\n# DB_HOST=d\n").unwrap();

        rewrite(
            &template,
            &output,
            &[("DB_HOST".to_string(), "mysql".to_string())],
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "XDB_HOST=a\nDB_HOST_EXTRA=b\nDB_HOST=mysql\r\n# DB_HOST=d\n"
        );
    }

    #[test]
    fn test_rewrite_reports_missing_keys() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let output = dir.path().join(".env.testing");
        fs::write(&template, "DB_HOST=sqlite\n").unwrap();

        let missing = rewrite(
            &template,
            &output,
            &[
                ("DB_HOST".to_string(), "mysql".to_string()),
                ("APP_ENV".to_string(), "testing".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(missing, vec!["APP_ENV"]);
        assert_eq!(fs::read_to_string(&output).unwrap(), "DB_HOST=mysql\n");
    }

    #[test]
    fn test_rewrite_value_is_literal() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let output = dir.path().join(".env");
        fs::write(&template, "DB_PASSWORD=\n").unwrap();

        rewrite(
            &template,
            &output,
            &[("DB_PASSWORD".to_string(), "p$1ss".to_string())],
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "DB_PASSWORD=p$1ss\n");
    }

    #[test]
    fn test_rewrite_missing_template() {
        let dir = TempDir::new().unwrap();
        let err = rewrite(
            &dir.path().join(".env.example"),
            &dir.path().join(".env"),
            &[],
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::FileNotFound(_)));
        assert!(!dir.path().join(".env").exists());
    }

    #[test]
    fn test_testing_overrides() {
        let overrides = testing_overrides(&Settings::default(), "demo");
        let get = |key: &str| {
            overrides
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("DB_USERNAME"), Some("demo_test"));
        assert_eq!(get("DB_PASSWORD"), Some("demo_test"));
        assert_eq!(get("DB_DATABASE"), Some("demo_test"));
        assert_eq!(get("APP_ENV"), Some("testing"));
        assert_eq!(get("APP_URL"), Some("http://demo.test"));
    }
}
