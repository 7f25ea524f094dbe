//! Layered build property store.
//!
//! Properties come from Phing-style `key = value` files, read in order with
//! later files overriding earlier ones:
//!
//! ```text
//! build.properties.dist    # shipped defaults
//! build.properties         # project settings
//! build.properties.local   # developer overrides, not committed
//! ```
//!
//! `project.basedir` is always defined (the project directory) and `-D
//! key=value` command line overrides sit on top of every file. Values may
//! reference other properties with `${key}`; references are expanded when a
//! value is requested.

use crate::errors::PropertyError;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("reference pattern is a valid regex"));

pub const PROJECT_BASEDIR: &str = "project.basedir";
pub const CHECK_STARTER_KIT: &str = "check-ssk";

/// Which kind of build is being reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReviewType {
    #[default]
    Platform,
    Subsite,
}

impl ReviewType {
    /// Properties that must resolve before a review of this type starts.
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            ReviewType::Platform => &[
                "lib.dir",
                "theme.dir",
                "resources.dir",
                "phpcs.config",
                "profile",
                PROJECT_BASEDIR,
            ],
            ReviewType::Subsite => &[
                "lib.dir",
                "theme.dir",
                "resources.dir",
                "phpcs.config",
                "profile",
                PROJECT_BASEDIR,
            ],
        }
    }

    /// Properties read when present.
    pub fn optional_keys(self) -> &'static [&'static str] {
        &[CHECK_STARTER_KIT]
    }
}

impl std::fmt::Display for ReviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewType::Platform => write!(f, "platform"),
            ReviewType::Subsite => write!(f, "subsite"),
        }
    }
}

/// Resolved properties for one run. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    values: BTreeMap<String, String>,
}

impl PropertyBag {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, PropertyError> {
        self.get(key).ok_or_else(|| PropertyError::Unresolved {
            key: key.to_string(),
            searched: "resolved settings".to_string(),
        })
    }

    /// Whether `key` is set to a truthy value (`1`, `true`, `yes`, `on`).
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }
}

impl FromIterator<(String, String)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Raw, unexpanded properties merged from every layer.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: HashMap<String, String>,
    sources: Vec<String>,
}

impl PropertyStore {
    /// A store holding only the built-in `project.basedir`.
    pub fn new(project_dir: &Path) -> Self {
        let mut store = Self::default();
        store.set(PROJECT_BASEDIR, project_dir.to_string_lossy());
        store
    }

    /// Load every layer: built-ins, each file in order (missing files are
    /// skipped), then command line overrides.
    pub fn load(
        project_dir: &Path,
        files: &[PathBuf],
        overrides: &[String],
    ) -> Result<Self, PropertyError> {
        let mut store = Self::new(project_dir);
        for file in files {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                project_dir.join(file)
            };
            store.load_file(&path)?;
        }
        if !overrides.is_empty() {
            for raw in overrides {
                let (key, value) = parse_override(raw)?;
                store.set(key, value);
            }
            store.sources.push("command line".to_string());
        }
        Ok(store)
    }

    /// Merge one property file over the current values. Returns `false` when
    /// the file does not exist.
    pub fn load_file(&mut self, path: &Path) -> Result<bool, PropertyError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "property file not found, skipping");
            return Ok(false);
        }
        let content = std::fs::read_to_string(path).map_err(|source| PropertyError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = parse_properties(&content);
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded property file");
        for (key, value) in entries {
            self.set(key, value);
        }
        self.sources.push(path.display().to_string());
        Ok(true)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// The expanded value of `key`, if set.
    pub fn get(&self, key: &str) -> Result<Option<String>, PropertyError> {
        match self.values.get(key) {
            Some(raw) => {
                let mut stack = vec![key.to_string()];
                self.expand(raw, &mut stack).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Resolve `required` keys (fatal when any is missing) plus whichever
    /// `optional` keys are set.
    pub fn request_settings(
        &self,
        required: &[&str],
        optional: &[&str],
    ) -> Result<PropertyBag, PropertyError> {
        let mut values = BTreeMap::new();
        for key in required {
            let value = self.get(key)?.ok_or_else(|| PropertyError::Unresolved {
                key: key.to_string(),
                searched: self.searched(),
            })?;
            values.insert(key.to_string(), value);
        }
        for key in optional {
            if let Some(value) = self.get(key)? {
                values.insert(key.to_string(), value);
            }
        }
        Ok(PropertyBag { values })
    }

    /// Resolve the settings a review of `review_type` needs.
    pub fn settings_for(&self, review_type: ReviewType) -> Result<PropertyBag, PropertyError> {
        tracing::debug!(%review_type, "resolving build properties");
        self.request_settings(review_type.required_keys(), review_type.optional_keys())
    }

    fn searched(&self) -> String {
        if self.sources.is_empty() {
            "built-in defaults only".to_string()
        } else {
            self.sources.join(", ")
        }
    }

    fn expand(&self, value: &str, stack: &mut Vec<String>) -> Result<String, PropertyError> {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(value) {
            let whole = caps.get(0).expect("capture 0 is the whole match");
            let name = &caps[1];
            out.push_str(&value[last..whole.start()]);
            last = whole.end();

            if stack.iter().any(|k| k == name) {
                return Err(PropertyError::Cycle {
                    key: name.to_string(),
                });
            }
            match self.values.get(name) {
                Some(raw) => {
                    stack.push(name.to_string());
                    out.push_str(&self.expand(raw, stack)?);
                    stack.pop();
                }
                // Unknown references stay verbatim, as Phing leaves them.
                None => out.push_str(whole.as_str()),
            }
        }
        out.push_str(&value[last..]);
        Ok(out)
    }
}

/// Parse `key = value` lines. Blank lines and lines starting with `#` or `!`
/// are ignored, as are lines without `=`.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn parse_override(raw: &str) -> Result<(String, String), PropertyError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(PropertyError::MalformedOverride(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_platform_properties(dir: &Path) {
        fs::write(
            dir.join("build.properties.dist"),
            "# Defaults\n\
             lib.dir = ${project.basedir}/lib\n\
             theme.dir = ${lib.dir}\n\
             resources.dir = ${project.basedir}/resources\n\
             phpcs.config = ${project.basedir}/phpcs.xml\n\
             profile = standard\n",
        )
        .unwrap();
    }

    #[test]
    fn test_parse_properties_skips_comments_and_blank_lines() {
        let entries = parse_properties("# comment\n! also comment\n\nkey = value\nbroken line\n a.b=c=d \n");
        assert_eq!(
            entries,
            vec![
                ("key".to_string(), "value".to_string()),
                ("a.b".to_string(), "c=d".to_string()),
            ]
        );
    }

    #[test]
    fn test_later_layers_override_earlier() {
        let dir = tempdir().unwrap();
        write_platform_properties(dir.path());
        fs::write(dir.path().join("build.properties"), "profile = multisite\n").unwrap();
        fs::write(dir.path().join("build.properties.local"), "profile = local_profile\n").unwrap();

        let files = vec![
            PathBuf::from("build.properties.dist"),
            PathBuf::from("build.properties"),
            PathBuf::from("build.properties.local"),
        ];
        let store = PropertyStore::load(dir.path(), &files, &[]).unwrap();
        assert_eq!(store.get("profile").unwrap().as_deref(), Some("local_profile"));

        let store = PropertyStore::load(dir.path(), &files, &["profile=cli".to_string()]).unwrap();
        assert_eq!(store.get("profile").unwrap().as_deref(), Some("cli"));
    }

    #[test]
    fn test_references_are_expanded() {
        let dir = tempdir().unwrap();
        write_platform_properties(dir.path());
        let store =
            PropertyStore::load(dir.path(), &[PathBuf::from("build.properties.dist")], &[]).unwrap();

        let base = dir.path().to_string_lossy().to_string();
        assert_eq!(store.get("lib.dir").unwrap(), Some(format!("{}/lib", base)));
        assert_eq!(store.get("theme.dir").unwrap(), Some(format!("{}/lib", base)));
    }

    #[test]
    fn test_unknown_reference_left_verbatim() {
        let mut store = PropertyStore::default();
        store.set("a", "${missing}/x");
        assert_eq!(store.get("a").unwrap().as_deref(), Some("${missing}/x"));
    }

    #[test]
    fn test_reference_cycle_is_fatal() {
        let mut store = PropertyStore::default();
        store.set("a", "${b}");
        store.set("b", "${a}");
        assert!(matches!(store.get("a"), Err(PropertyError::Cycle { .. })));
    }

    #[test]
    fn test_request_settings_fails_on_unresolved_key() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("build.properties"), "lib.dir = lib\n").unwrap();
        let store = PropertyStore::load(dir.path(), &[PathBuf::from("build.properties")], &[]).unwrap();

        let err = store.settings_for(ReviewType::Platform).unwrap_err();
        match err {
            PropertyError::Unresolved { key, searched } => {
                assert_eq!(key, "theme.dir");
                assert!(searched.contains("build.properties"));
            }
            other => panic!("Expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_settings_include_optional_keys_when_set() {
        let dir = tempdir().unwrap();
        write_platform_properties(dir.path());
        let files = vec![PathBuf::from("build.properties.dist")];

        let store = PropertyStore::load(dir.path(), &files, &[]).unwrap();
        let bag = store.settings_for(ReviewType::Subsite).unwrap();
        assert_eq!(bag.get("profile"), Some("standard"));
        assert_eq!(bag.get(CHECK_STARTER_KIT), None);
        assert!(!bag.is_enabled(CHECK_STARTER_KIT));

        let store =
            PropertyStore::load(dir.path(), &files, &["check-ssk=TRUE".to_string()]).unwrap();
        let bag = store.settings_for(ReviewType::Platform).unwrap();
        assert!(bag.is_enabled(CHECK_STARTER_KIT));
    }

    #[test]
    fn test_project_basedir_is_builtin() {
        let store = PropertyStore::new(Path::new("/srv/platform"));
        assert_eq!(store.get(PROJECT_BASEDIR).unwrap().as_deref(), Some("/srv/platform"));
    }

    #[test]
    fn test_malformed_override_rejected() {
        let result = PropertyStore::load(Path::new("/proj"), &[], &["novalue".to_string()]);
        assert!(matches!(result, Err(PropertyError::MalformedOverride(_))));
    }

    #[test]
    fn test_review_types_share_required_keys() {
        assert_eq!(
            ReviewType::Platform.required_keys(),
            ReviewType::Subsite.required_keys()
        );
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "Yes", " on "] {
            assert!(is_truthy(value), "{value} should be truthy");
        }
        for value in ["0", "false", "", "no"] {
            assert!(!is_truthy(value), "{value} should not be truthy");
        }
    }
}
