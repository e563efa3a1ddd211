//! Template discovery, validation, rendering and project generation.

mod error;
mod generator;
mod loader;
mod renderer;
mod types;
mod validator;

pub use error::{TemplateError, TemplateErrorExt};
pub use generator::{
    CREATE_TIME_VAR, PROJECT_NAME_VAR, generate_project, prepare_variables, write_files,
};
pub use loader::{
    MANIFEST, TEMPLATE_SUFFIX, TEMPLATES_DIR_ENV, find_template, list_templates, load_template,
    search_paths,
};
pub use renderer::Renderer;
pub use types::{
    GenerationConfig, GenerationReport, RenderedFile, Template, TemplateFile, TemplateInfo,
    VariableDef, Variables,
};
pub use validator::{prepare_output_dir, validate_config, validate_template, validate_variables};
