use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::args::NewArgs;
use crate::tmpl::{GenerationConfig, TemplateInfo, Variables, generate_project, list_templates};

pub const MODULE_PATH_VAR: &str = "ModulePath";

/// Builds the generation request for `scaffold new`.
///
/// `ModulePath` comes from a non-empty `--var ModulePath=...`, then a
/// non-empty `--module`, then `github.com/user/<PROJECT>`.
///
/// # Errors
/// Returns an error if the working directory cannot be resolved.
pub fn generation_config(args: &NewArgs) -> Result<GenerationConfig> {
    let mut variables: Variables =
        args.vars.iter().map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone()))).collect();

    let module_path = variables
        .get(MODULE_PATH_VAR)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .or_else(|| args.module.clone().filter(|m| !m.is_empty()))
        .unwrap_or_else(|| format!("github.com/user/{}", args.project));
    variables.insert(MODULE_PATH_VAR.to_owned(), module_path.into());

    let output_dir = match &args.output {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving working directory")?.join(&args.project),
    };

    Ok(GenerationConfig {
        template_name: args.template.clone(),
        output_dir,
        project_name: args.project.clone(),
        variables,
        force: args.force,
        template_dirs: args.templates_dirs.clone(),
    })
}

/// Runs `scaffold new`.
///
/// # Errors
/// Returns an error if any generation step fails.
pub fn new_project(args: &NewArgs) -> Result<()> {
    let config = generation_config(args)?;

    println!("🔨 Creating '{}' from template '{}'...", config.project_name, config.template_name);
    let report = generate_project(&config)
        .with_context(|| format!("failed to create project '{}'", config.project_name))?;

    for file in &report.files {
        println!("  + {}", relative(file, &report.output_dir).display());
    }
    println!("✅ Project '{}' created at {}", config.project_name, report.output_dir.display());
    Ok(())
}

fn relative<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}

/// Runs `scaffold list`.
///
/// # Errors
/// Returns an error if the working directory cannot be resolved.
pub fn list(templates_dirs: &[PathBuf]) -> Result<()> {
    let templates = list_templates(templates_dirs)?;
    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    println!("Available templates:");
    for template in &templates {
        print!("{}", describe(template));
    }
    Ok(())
}

/// One listing entry: name, description, version and variables.
#[must_use]
pub fn describe(template: &TemplateInfo) -> String {
    let mut out = format!("\n  {}", template.name);
    if !template.version.is_empty() {
        out.push_str(&format!(" (v{})", template.version));
    }
    out.push('\n');
    if !template.description.is_empty() {
        out.push_str(&format!("    {}\n", template.description));
    }
    if !template.variables.is_empty() {
        out.push_str("    Variables:\n");
        for var in &template.variables {
            let required = if var.required { " (required)" } else { "" };
            let description = if var.description.is_empty() {
                String::new()
            } else {
                format!(": {}", var.description)
            };
            out.push_str(&format!("      - {}{required}{description}\n", var.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmpl::VariableDef;

    fn args() -> NewArgs {
        NewArgs {
            project: "demo".to_owned(),
            template: "axum-service".to_owned(),
            output: Some(PathBuf::from("/tmp/demo")),
            module: None,
            force: false,
            vars: Vec::new(),
            templates_dirs: Vec::new(),
        }
    }

    #[test]
    fn module_path_precedence() {
        let cfg = generation_config(&args()).unwrap();
        assert_eq!(cfg.variables[MODULE_PATH_VAR], "github.com/user/demo");

        let mut with_flag = args();
        with_flag.module = Some("example.com/flag".to_owned());
        assert_eq!(generation_config(&with_flag).unwrap().variables[MODULE_PATH_VAR], "example.com/flag");

        let mut with_both = args();
        with_both.module = Some("example.com/flag".to_owned());
        with_both.vars.push((MODULE_PATH_VAR.to_owned(), "example.com/var".to_owned()));
        assert_eq!(generation_config(&with_both).unwrap().variables[MODULE_PATH_VAR], "example.com/var");
    }

    #[test]
    fn empty_module_path_var_falls_through() {
        let mut a = args();
        a.vars.push((MODULE_PATH_VAR.to_owned(), String::new()));
        a.module = Some("example.com/flag".to_owned());
        assert_eq!(generation_config(&a).unwrap().variables[MODULE_PATH_VAR], "example.com/flag");

        a.module = Some(String::new());
        assert_eq!(generation_config(&a).unwrap().variables[MODULE_PATH_VAR], "github.com/user/demo");
    }

    #[test]
    fn output_defaults_to_project_dir() {
        let mut a = args();
        a.output = None;
        let cfg = generation_config(&a).unwrap();
        assert!(cfg.output_dir.ends_with("demo"));
        assert!(cfg.output_dir.is_absolute());
    }

    #[test]
    fn describe_marks_required() {
        let info = TemplateInfo {
            name: "svc".to_owned(),
            description: "A service".to_owned(),
            version: "1.0.0".to_owned(),
            variables: vec![
                VariableDef { name: "ModulePath".to_owned(), required: true, ..VariableDef::default() },
                VariableDef {
                    name: "Port".to_owned(),
                    description: "listen port".to_owned(),
                    ..VariableDef::default()
                },
            ],
            ..TemplateInfo::default()
        };
        let text = describe(&info);
        assert!(text.contains("svc (v1.0.0)"));
        assert!(text.contains("- ModulePath (required)"));
        assert!(text.contains("- Port: listen port"));
    }
}
