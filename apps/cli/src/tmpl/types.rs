use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Values available to templates, keyed by variable name.
pub type Variables = BTreeMap<String, serde_json::Value>;

/// Contents of a template's `template.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub variables: Vec<VariableDef>,
    /// Directory the template was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableDef {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Any YAML scalar or collection.
    pub default: Option<serde_json::Value>,
    /// Informational: `string`, `int`, `bool`, ...
    #[serde(rename = "type")]
    pub kind: String,
}

/// One file of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative to the template directory.
    pub source_path: PathBuf,
    /// Relative output path, `.tmpl` stripped; may itself contain `{{ }}`.
    pub target_path: String,
    pub is_template: bool,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub info: TemplateInfo,
    pub files: Vec<TemplateFile>,
    pub base_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub target_path: PathBuf,
    pub content: Vec<u8>,
}

/// Inputs for [`generate_project`](crate::tmpl::generate_project).
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub template_name: String,
    pub output_dir: PathBuf,
    pub project_name: String,
    /// User-supplied values; they override template defaults.
    pub variables: Variables,
    /// Replace a non-empty output directory.
    pub force: bool,
    /// Searched before the standard template locations.
    pub template_dirs: Vec<PathBuf>,
}

/// What [`generate_project`](crate::tmpl::generate_project) wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub template: String,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    /// Absolute paths, in write order.
    pub files: Vec<PathBuf>,
}
