//! Configuration for the review orchestrator, read from `qa.toml` at the
//! project root.
//!
//! Layering follows file → CLI: a missing file means built-in defaults, and
//! command line flags override what the file says.
//!
//! # Configuration File Format
//!
//! ```toml
//! [review]
//! ruler_min = 80
//! descriptor_suffix = "info"
//! manifest_suffix = "make"
//! excluded_dirs = ["contrib", "contributed"]
//! excluded_checks = ["help", "list"]
//! starter_kit_check = "check:ssk"
//! post_check = "theme:conflict"
//! keep_unmatched_checks = true
//!
//! [properties]
//! files = ["build.properties.dist", "build.properties", "build.properties.local"]
//!
//! [[checks]]
//! name = "phpcs:module"
//! command = "./resources/qa/phpcs.sh"
//! params = ["directory", "standard", "exclude-dirs"]
//! ```

use crate::checks::{CheckDefinition, validate_checks};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "qa.toml";

/// Review engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSection {
    /// Minimum width of the report ruler
    #[serde(default = "default_ruler_min")]
    pub ruler_min: usize,
    /// Extension of module, feature and theme descriptor files
    #[serde(default = "default_descriptor_suffix")]
    pub descriptor_suffix: String,
    /// Extension of build manifest files
    #[serde(default = "default_manifest_suffix")]
    pub manifest_suffix: String,
    /// Directory names never searched for descriptors
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Check names never run per unit (the starter kit check is always added)
    #[serde(default = "default_excluded_checks")]
    pub excluded_checks: Vec<String>,
    /// Check run before selection when the `check-ssk` property is truthy
    #[serde(default = "default_starter_kit_check")]
    pub starter_kit_check: String,
    /// Check run once after every unit has been reviewed
    #[serde(default = "default_post_check")]
    pub post_check: String,
    /// Whether a check accepting none of the shared parameters still runs
    #[serde(default = "default_keep_unmatched_checks")]
    pub keep_unmatched_checks: bool,
}

fn default_ruler_min() -> usize {
    80
}

fn default_descriptor_suffix() -> String {
    "info".to_string()
}

fn default_manifest_suffix() -> String {
    "make".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["contrib".to_string(), "contributed".to_string()]
}

fn default_excluded_checks() -> Vec<String> {
    vec!["help".to_string(), "list".to_string()]
}

fn default_starter_kit_check() -> String {
    "check:ssk".to_string()
}

fn default_post_check() -> String {
    "theme:conflict".to_string()
}

fn default_keep_unmatched_checks() -> bool {
    true
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            ruler_min: default_ruler_min(),
            descriptor_suffix: default_descriptor_suffix(),
            manifest_suffix: default_manifest_suffix(),
            excluded_dirs: default_excluded_dirs(),
            excluded_checks: default_excluded_checks(),
            starter_kit_check: default_starter_kit_check(),
            post_check: default_post_check(),
            keep_unmatched_checks: default_keep_unmatched_checks(),
        }
    }
}

impl ReviewSection {
    /// Names excluded from per-unit review, including the starter kit check.
    pub fn all_excluded_checks(&self) -> Vec<String> {
        let mut excluded = self.excluded_checks.clone();
        if !excluded.contains(&self.starter_kit_check) {
            excluded.push(self.starter_kit_check.clone());
        }
        excluded
    }
}

/// Build property layering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertiesSection {
    /// Property files in load order, relative to the project directory
    #[serde(default = "default_property_files")]
    pub files: Vec<PathBuf>,
}

fn default_property_files() -> Vec<PathBuf> {
    vec![
        PathBuf::from("build.properties.dist"),
        PathBuf::from("build.properties"),
        PathBuf::from("build.properties.local"),
    ]
}

impl Default for PropertiesSection {
    fn default() -> Self {
        Self {
            files: default_property_files(),
        }
    }
}

/// The complete qa.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QaToml {
    #[serde(default)]
    pub review: ReviewSection,
    #[serde(default)]
    pub properties: PropertiesSection,
    #[serde(default)]
    pub checks: Vec<CheckDefinition>,
}

impl QaToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse qa.toml")
    }

    /// Load `qa.toml` from the project directory, or defaults if it is absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize qa.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Defaults plus one definition per standard platform check, used by
    /// `qa config init`.
    pub fn starter() -> Self {
        let script = |name: &str| format!("./resources/qa/{}.sh", name);
        Self {
            checks: vec![
                CheckDefinition::new("phpcs:module", script("phpcs"))
                    .with_params(&["directory", "standard", "exclude-dirs"])
                    .with_description("Coding standards"),
                CheckDefinition::new("scan:todo", script("todo"))
                    .with_params(&["directory", "exclude-dirs"])
                    .with_description("TODO comments"),
                CheckDefinition::new("scan:coco", script("coco"))
                    .with_params(&["directory", "exclude-dirs"])
                    .with_description("Coding standards ignore annotations"),
                CheckDefinition::new("check:git-hooks", script("git-hooks"))
                    .with_params(&["directory", "filename"])
                    .with_description("Update hooks for git diff"),
                CheckDefinition::new("diff:make", script("diff-make"))
                    .with_params(&["filename", "project.basedir"])
                    .with_description("Build manifest changes"),
                CheckDefinition::new("check:ssk", script("ssk"))
                    .with_description("Subsite starter kit"),
                CheckDefinition::new("theme:conflict", script("theme-conflict"))
                    .with_description("Theme name conflicts"),
            ],
            ..Self::default()
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = validate_checks(&self.checks);

        if self.review.ruler_min == 0 {
            warnings.push("ruler_min is 0: report sections will have no ruler".to_string());
        }
        if self.review.descriptor_suffix == self.review.manifest_suffix {
            warnings.push(format!(
                "descriptor_suffix and manifest_suffix are both '{}'",
                self.review.descriptor_suffix
            ));
        }

        let registered = |name: &str| self.checks.iter().any(|c| c.enabled && c.name == name);
        if !registered(&self.review.post_check) {
            warnings.push(format!(
                "post_check '{}' is not a registered check; reviews will fail",
                self.review.post_check
            ));
        }
        if !registered(&self.review.starter_kit_check) {
            warnings.push(format!(
                "starter_kit_check '{}' is not a registered check; reviews with check-ssk set will fail",
                self.review.starter_kit_check
            ));
        }

        warnings
    }
}

/// Configuration for one run: the parsed file plus CLI overrides.
#[derive(Debug, Clone)]
pub struct QaConfig {
    pub project_dir: PathBuf,
    pub toml: QaToml,
    /// `-D key=value` build property overrides
    pub property_overrides: Vec<String>,
}

impl QaConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        Self::with_cli_args(project_dir, Vec::new())
    }

    pub fn with_cli_args(project_dir: PathBuf, property_overrides: Vec<String>) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve project directory {}", project_dir.display()))?;
        let toml = QaToml::load_or_default(&project_dir)?;

        for warning in toml.validate() {
            tracing::warn!("{}", warning);
        }

        Ok(Self {
            project_dir,
            toml,
            property_overrides,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE)
    }

    pub fn review(&self) -> &ReviewSection {
        &self.toml.review
    }
}
