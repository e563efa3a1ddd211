use chrono::Local;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::error::{TemplateError, TemplateErrorExt};
use super::loader::{find_template, load_template};
use super::renderer::Renderer;
use super::types::{GenerationConfig, GenerationReport, RenderedFile, TemplateInfo, Variables};
use super::validator::{prepare_output_dir, validate_config, validate_template, validate_variables};

pub const PROJECT_NAME_VAR: &str = "ProjectName";
pub const CREATE_TIME_VAR: &str = "CreateTime";
const CREATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generates a project from a template.
///
/// Steps: validate the request, locate and load the template, validate it,
/// merge variables, check required ones, prepare the output directory,
/// render every file and write the results.
///
/// Nothing is written when any step before the last two fails.
///
/// # Errors
/// The first failing step's [`TemplateError`].
pub fn generate_project(config: &GenerationConfig) -> Result<GenerationReport, TemplateError> {
    validate_config(config)?;

    let template_path = find_template(&config.template_name, &config.template_dirs)?;
    let template = load_template(&template_path)?;
    validate_template(&template)?;

    let vars = prepare_variables(&template.info, &config.variables, &config.project_name);
    validate_variables(&template.info, &vars)?;

    // Render before touching the output dir so a bad template leaves it as is.
    let renderer = Renderer::new();
    let rendered = renderer.render_all(&template.files, &vars)?;

    prepare_output_dir(&config.output_dir, config.force)?;
    let output_dir = std::path::absolute(&config.output_dir)
        .context(config.output_dir.display().to_string())?;
    let files = write_files(&output_dir, &rendered)?;

    info!(
        template = %template.info.name,
        project = %config.project_name,
        output = %output_dir.display(),
        files = files.len(),
        "project generated"
    );
    Ok(GenerationReport { template: template.info.name, template_path, output_dir, files })
}

/// Template defaults, overridden by user values, then `ProjectName` and
/// `CreateTime`.
#[must_use]
pub fn prepare_variables(info: &TemplateInfo, user: &Variables, project_name: &str) -> Variables {
    let mut vars: Variables = info
        .variables
        .iter()
        .filter_map(|def| def.default.clone().map(|value| (def.name.clone(), value)))
        .collect();

    vars.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars.insert(PROJECT_NAME_VAR.to_owned(), project_name.into());
    vars.insert(CREATE_TIME_VAR.to_owned(), Local::now().format(CREATE_TIME_FORMAT).to_string().into());
    vars
}

/// Writes rendered files under `output_dir`, creating parent directories.
///
/// # Errors
/// [`TemplateError::Validation`] for targets escaping `output_dir`; IO errors
/// with the target path as context.
pub fn write_files(output_dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>, TemplateError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        if file.target_path.is_absolute()
            || file.target_path.components().any(|c| matches!(c, Component::ParentDir))
        {
            return Err(TemplateError::Validation {
                message: format!("target {} escapes the output directory", file.target_path.display())
                    .into(),
                context: None,
            });
        }

        let target = output_dir.join(&file.target_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).context(format!("creating {}", parent.display()))?;
        }
        fs::write(&target, &file.content).context(format!("writing {}", target.display()))?;
        debug!(path = %target.display(), bytes = file.content.len(), "file written");
        written.push(target);
    }
    Ok(written)
}
