use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::path::{Path, PathBuf};

use super::error::{TemplateError, TemplateErrorExt};
use super::types::{RenderedFile, TemplateFile, Variables};

/// Renders template files with the case and path filters registered.
///
/// Filters: `snakecase`, `camelcase`, `pascalcase`, `kebabcase`,
/// `capitalize_words`, `base`, `dir`, `ext` and `noext`.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);

        env.add_filter("snakecase", |s: String| blocks_strings::snake_case(&s));
        env.add_filter("camelcase", |s: String| blocks_strings::camel_case(&s));
        env.add_filter("pascalcase", |s: String| blocks_strings::pascal_case(&s));
        env.add_filter("kebabcase", |s: String| blocks_strings::kebab_case(&s));
        env.add_filter("capitalize_words", |s: String| blocks_strings::capitalize_words(&s));
        env.add_filter("base", |s: String| base(&s));
        env.add_filter("dir", |s: String| dir(&s));
        env.add_filter("ext", |s: String| ext(&s));
        env.add_filter("noext", |s: String| noext(&s));

        Self { env }
    }

    /// Renders `source` against `vars`; `name` appears in error messages.
    ///
    /// # Errors
    /// [`TemplateError::Render`] for syntax errors or failing filters.
    pub fn render_str(&self, name: &str, source: &str, vars: &Variables) -> Result<String, TemplateError> {
        self.env.render_named_str(name, source, vars).context(name.to_owned())
    }

    /// Renders one file. Non-template files are passed through unchanged;
    /// a target path containing `{{` is rendered either way.
    ///
    /// # Errors
    /// [`TemplateError::Render`] or [`TemplateError::Validation`] for
    /// non-UTF-8 template content, with the source path as context.
    pub fn render_file(&self, file: &TemplateFile, vars: &Variables) -> Result<RenderedFile, TemplateError> {
        let name = file.source_path.display().to_string();

        let target = if file.target_path.contains("{{") {
            self.render_str(&name, &file.target_path, vars)?
        } else {
            file.target_path.clone()
        };

        let content = if file.is_template {
            let text = std::str::from_utf8(&file.content).map_err(|e| TemplateError::Validation {
                message: format!("template is not valid UTF-8: {e}").into(),
                context: Some(name.clone().into()),
            })?;
            self.render_str(&name, text, vars)?.into_bytes()
        } else {
            file.content.clone()
        };

        Ok(RenderedFile { target_path: PathBuf::from(target), content })
    }

    /// Renders every file, stopping at the first failure.
    ///
    /// # Errors
    /// See [`Renderer::render_file`].
    pub fn render_all(
        &self,
        files: &[TemplateFile],
        vars: &Variables,
    ) -> Result<Vec<RenderedFile>, TemplateError> {
        files.iter().map(|file| self.render_file(file, vars)).collect()
    }
}

fn base(path: &str) -> String {
    Path::new(path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn dir(path: &str) -> String {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_owned(),
    }
}

fn ext(path: &str) -> String {
    Path::new(path).extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default()
}

fn noext(path: &str) -> String {
    let suffix = ext(path);
    path.strip_suffix(suffix.as_str()).unwrap_or(path).to_owned()
}
