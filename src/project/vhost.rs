//! nginx virtual host files for projects

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    config::StackSettings,
    error::{ProvisionError, Result},
};

/// Replace the first occurrence of `placeholder` on each line
pub fn render(template: &str, placeholder: &str, project: &str) -> String {
    template
        .split_inclusive('\n')
        .map(|line| line.replacen(placeholder, project, 1))
        .collect()
}

pub fn template_path(root: &Path, stack: &StackSettings) -> PathBuf {
    root.join(&stack.sites_dir).join(&stack.vhost_template)
}

pub fn vhost_path(root: &Path, stack: &StackSettings, project: &str) -> PathBuf {
    root.join(&stack.sites_dir).join(format!("{}.conf", project))
}

/// Write `<sites_dir>/<project>.conf` from the stack's template
pub fn create(root: &Path, stack: &StackSettings, project: &str) -> Result<PathBuf> {
    let template = template_path(root, stack);
    if !template.is_file() {
        return Err(ProvisionError::FileNotFound(template));
    }

    let content = fs::read_to_string(&template).map_err(|e| ProvisionError::io(&template, e))?;
    let target = vhost_path(root, stack, project);

    fs::write(&target, render(&content, &stack.vhost_placeholder, project))
        .map_err(|e| ProvisionError::io(&target, e))?;

    Ok(target)
}

/// Delete the project's vhost. Returns false if it did not exist.
pub fn remove(root: &Path, stack: &StackSettings, project: &str) -> Result<bool> {
    let target = vhost_path(root, stack, project);

    match fs::remove_file(&target) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ProvisionError::io(&target, e)),
    }
}
