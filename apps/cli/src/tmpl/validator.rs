use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::error::{TemplateError, TemplateErrorExt};
use super::types::{GenerationConfig, Template, TemplateInfo, Variables};

fn invalid(message: impl Into<String>) -> TemplateError {
    TemplateError::Validation { message: message.into().into(), context: None }
}

fn invalid_at(message: impl Into<String>, location: &Path) -> TemplateError {
    TemplateError::Validation {
        message: message.into().into(),
        context: Some(location.display().to_string().into()),
    }
}

/// Checks the request before any template is touched.
///
/// # Errors
/// [`TemplateError::Validation`] for an empty template name, project name or
/// output directory, a project name that cannot be a directory name, or an
/// occupied output directory without `force`.
pub fn validate_config(config: &GenerationConfig) -> Result<(), TemplateError> {
    if config.template_name.trim().is_empty() {
        return Err(invalid("template name is required"));
    }
    if config.project_name.trim().is_empty() {
        return Err(invalid("project name is required"));
    }
    if config.project_name.contains(['/', '\\']) || matches!(config.project_name.as_str(), "." | "..") {
        return Err(invalid(format!("project name '{}' is not a valid directory name", config.project_name)));
    }
    if config.output_dir.as_os_str().is_empty() {
        return Err(invalid("output directory is required"));
    }
    if !config.force && is_occupied(&config.output_dir) {
        return Err(invalid(format!(
            "output directory {} already exists (use --force to overwrite)",
            config.output_dir.display()
        )));
    }
    Ok(())
}

/// A file, or a directory with at least one entry.
fn is_occupied(path: &Path) -> bool {
    if path.is_dir() {
        fs::read_dir(path).map(|mut entries| entries.next().is_some()).unwrap_or(true)
    } else {
        path.exists()
    }
}

/// A template needs a name and at least one file.
///
/// # Errors
/// [`TemplateError::Validation`] naming the template directory.
pub fn validate_template(template: &Template) -> Result<(), TemplateError> {
    let location = template.base_path.as_path();
    if template.info.name.trim().is_empty() {
        return Err(invalid_at("template.yaml has no name", location));
    }
    if template.files.is_empty() {
        return Err(invalid_at(format!("template '{}' has no files", template.info.name), location));
    }
    for def in &template.info.variables {
        if def.name.trim().is_empty() {
            return Err(invalid_at("variable definition without a name", location));
        }
    }
    Ok(())
}

fn is_missing(vars: &Variables, name: &str) -> bool {
    match vars.get(name) {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Every required variable must be present and non-empty.
///
/// # Errors
/// [`TemplateError::Validation`] listing all missing variables.
pub fn validate_variables(info: &TemplateInfo, vars: &Variables) -> Result<(), TemplateError> {
    let missing: Vec<&str> = info
        .variables
        .iter()
        .filter(|def| def.required && is_missing(vars, &def.name))
        .map(|def| def.name.as_str())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(invalid(format!("missing required variables: {}", missing.join(", "))))
    }
}

/// Creates `dir`, or clears it when `force` is set.
///
/// # Errors
/// [`TemplateError::Validation`] when `dir` is a file, or a non-empty
/// directory without `force`; IO errors otherwise.
pub fn prepare_output_dir(dir: &Path, force: bool) -> Result<(), TemplateError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(invalid(format!("{} exists and is not a directory", dir.display())));
        }
        if is_occupied(dir) {
            if !force {
                return Err(invalid(format!(
                    "output directory {} is not empty (use --force to overwrite)",
                    dir.display()
                )));
            }
            warn!(path = %dir.display(), "removing existing output directory");
            fs::remove_dir_all(dir).context(format!("removing {}", dir.display()))?;
        }
    }

    fs::create_dir_all(dir).context(format!("creating {}", dir.display()))?;
    debug!(path = %dir.display(), "output directory ready");
    Ok(())
}
