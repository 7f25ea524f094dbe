//! Check definitions as declared in the `[[checks]]` tables of `qa.toml`.

use crate::review::builder::SHARED_PARAMS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Namespaces whose members are orchestration commands rather than checks.
const META_PREFIXES: &[&str] = &["review:", "theme:"];

/// Whether a registered command is a reviewable check or a meta command.
///
/// Meta commands (the review entry points, the theme conflict check) are
/// never offered for per-unit execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Check,
    Meta,
}

impl Category {
    /// Category for a definition that did not declare one.
    pub fn infer(name: &str) -> Self {
        if META_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            Category::Meta
        } else {
            Category::Check
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Check => write!(f, "check"),
            Category::Meta => write!(f, "meta"),
        }
    }
}

/// A single check definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// Registry name, e.g. `phpcs:module` or `scan:todo`
    pub name: String,

    /// Shell command to execute; parameters are appended as `--name=value`
    #[serde(default)]
    pub command: Option<String>,

    /// Parameter names this check accepts from the shared parameter set
    #[serde(default)]
    pub params: Vec<String>,

    /// Explicit category; inferred from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Working directory for the command, relative to the project directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CheckDefinition {
    /// Create a new check definition running `command`.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: Some(command.into()),
            params: Vec::new(),
            category: None,
            description: None,
            working_dir: None,
            enabled: true,
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The declared category, or the one inferred from the name.
    pub fn resolved_category(&self) -> Category {
        self.category.unwrap_or_else(|| Category::infer(&self.name))
    }
}

/// Validate a list of check definitions and return any warnings.
pub fn validate_checks(checks: &[CheckDefinition]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for (i, check) in checks.iter().enumerate() {
        if check.name.trim().is_empty() {
            warnings.push(format!("Check {} has an empty name", i + 1));
            continue;
        }
        if !seen.insert(check.name.as_str()) {
            warnings.push(format!("Check '{}' is defined more than once", check.name));
        }
        if check.command.as_deref().is_none_or(|c| c.trim().is_empty()) {
            warnings.push(format!("Check '{}' has no command specified", check.name));
        }
        for param in &check.params {
            if !SHARED_PARAMS.contains(&param.as_str()) {
                warnings.push(format!(
                    "Check '{}' declares unknown parameter '{}' (known: {})",
                    check.name,
                    param,
                    SHARED_PARAMS.join(", ")
                ));
            }
        }
    }

    warnings
}
