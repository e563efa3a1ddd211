use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::error::{TemplateError, TemplateErrorExt};
use super::types::{Template, TemplateFile, TemplateInfo};

pub const MANIFEST: &str = "template.yaml";
pub const TEMPLATE_SUFFIX: &str = ".tmpl";
/// Extra template root, searched before the working-directory locations.
pub const TEMPLATES_DIR_ENV: &str = "BLOCKS_TEMPLATES_DIR";

/// Loads the manifest and every file under `dir`, sorted by path.
///
/// # Errors
/// [`TemplateError::NotFound`] when `dir` is not a directory; IO, walk or
/// manifest errors otherwise.
pub fn load_template(dir: &Path) -> Result<Template, TemplateError> {
    if !dir.is_dir() {
        return Err(TemplateError::NotFound {
            message: format!("{} is not a directory", dir.display()).into(),
            context: None,
        });
    }

    let mut info = load_info(&dir.join(MANIFEST))?;
    info.path = dir.to_path_buf();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context(format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() || entry.file_name() == MANIFEST {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path()).to_path_buf();
        let content =
            fs::read(entry.path()).context(format!("reading {}", entry.path().display()))?;
        files.push(classify(relative, content));
    }
    files.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    debug!(template = %info.name, files = files.len(), path = %dir.display(), "template loaded");
    Ok(Template { info, files, base_path: dir.to_path_buf() })
}

fn load_info(path: &Path) -> Result<TemplateInfo, TemplateError> {
    let raw = fs::read_to_string(path).context(format!("reading {}", path.display()))?;
    serde_yaml::from_str(&raw).context(path.display().to_string())
}

/// A file is a template when named `*.tmpl` or when its text contains `{{`.
fn classify(source_path: PathBuf, content: Vec<u8>) -> TemplateFile {
    let relative = source_path.to_string_lossy().replace('\\', "/");
    let has_suffix = relative.ends_with(TEMPLATE_SUFFIX);
    let has_markup = std::str::from_utf8(&content).is_ok_and(|text| text.contains("{{"));

    let target_path = relative.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&relative).to_owned();
    TemplateFile { source_path, target_path, is_template: has_suffix || has_markup, content }
}

/// Candidate directories for template `name`, in search order.
#[must_use]
pub fn search_paths(name: &str, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut paths: Vec<PathBuf> =
        template_roots(&cwd, extra_dirs).into_iter().map(|root| root.join(name)).collect();
    paths.push(PathBuf::from(name));
    paths.push(cwd.join(name));
    paths
}

/// Directories that hold templates, in search order.
fn template_roots(cwd: &Path, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots = extra_dirs.to_vec();
    if let Some(dir) = env::var_os(TEMPLATES_DIR_ENV).filter(|d| !d.is_empty()) {
        roots.push(PathBuf::from(dir));
    }
    roots.push(cwd.join("apps").join("cli").join("templates"));
    roots.push(cwd.join("templates"));
    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir.join("templates"));
        roots.push(exe_dir.join("..").join("templates"));
    }
    roots
}

/// Absolute path of the first candidate directory that holds a manifest.
///
/// # Errors
/// [`TemplateError::NotFound`] listing every searched path.
pub fn find_template(name: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf, TemplateError> {
    let candidates = search_paths(name, extra_dirs);
    for path in &candidates {
        if path.join(MANIFEST).is_file() {
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            debug!(template = name, path = %absolute.display(), "template found");
            return Ok(absolute);
        }
    }

    let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(TemplateError::NotFound {
        message: format!("'{name}' (searched: {})", searched.join(", ")).into(),
        context: None,
    })
}

/// Templates from the first root that has at least one loadable template,
/// sorted by name.
///
/// # Errors
/// Never fails for missing or unreadable roots; they are skipped.
pub fn list_templates(extra_dirs: &[PathBuf]) -> Result<Vec<TemplateInfo>, TemplateError> {
    let cwd = env::current_dir().context("resolving working directory")?;

    for root in template_roots(&cwd, extra_dirs) {
        let Ok(entries) = fs::read_dir(&root) else {
            continue;
        };
        let mut found: Vec<TemplateInfo> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| match load_template(&e.path()) {
                Ok(template) => Some(template.info),
                Err(err) => {
                    debug!(path = %e.path().display(), "skipping directory: {err}");
                    None
                },
            })
            .collect();

        if !found.is_empty() {
            found.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(found);
        }
    }
    Ok(Vec::new())
}
