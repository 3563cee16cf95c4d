use std::path::Path;

use crate::error::{ProvisionError, Result};

/// Strip trailing path separators, so tab-completed `demo/` works, and
/// reject names that are unsafe to use as database identifiers or hostnames.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim_end_matches(['/', '\\']);

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid {
        return Err(ProvisionError::InvalidProjectName(raw.to_string()));
    }

    Ok(name.to_string())
}

/// Fail unless `base/dir` is an existing directory
pub fn assert_directory(base: &Path, dir: &str) -> Result<()> {
    if !base.join(dir).is_dir() {
        return Err(ProvisionError::MissingDirectory(dir.into()));
    }
    Ok(())
}
