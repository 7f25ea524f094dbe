//! Unit discovery: finds the descriptor (`*.info`) and build manifest
//! (`*.make`) files a review can target.
//!
//! Descriptor searches prune vendored subtrees (`contrib`, `contributed` by
//! default); manifest searches do not. Every search is recursive, returns
//! canonical paths sorted by path, and yields nothing for a missing root.

use crate::properties::PropertyBag;
use crate::qa_config::ReviewSection;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Which set of units a review offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Section {
    /// Build manifests, modules and features
    #[default]
    Default,
    /// Themes only
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Descriptor,
    Manifest,
}

/// A selectable descriptor or manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub path: PathBuf,
    /// File name shown in the selection prompt
    pub name: String,
    pub kind: UnitKind,
}

impl Unit {
    /// Directory containing the unit file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// File suffixes and pruning rules for unit searches.
#[derive(Debug, Clone)]
pub struct Discovery {
    descriptor_suffix: String,
    manifest_suffix: String,
    excluded_dirs: Vec<String>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::from_section(&ReviewSection::default())
    }
}

impl Discovery {
    pub fn from_section(review: &ReviewSection) -> Self {
        Self {
            descriptor_suffix: review.descriptor_suffix.clone(),
            manifest_suffix: review.manifest_suffix.clone(),
            excluded_dirs: review.excluded_dirs.clone(),
        }
    }

    pub fn kind_of(&self, path: &Path) -> UnitKind {
        match path.extension() {
            Some(ext) if ext.to_string_lossy() == self.manifest_suffix => UnitKind::Manifest,
            _ => UnitKind::Descriptor,
        }
    }

    /// Descriptor files under `root`, skipping excluded directories.
    pub fn descriptors(&self, root: &Path) -> Vec<Unit> {
        self.find(root, &self.descriptor_suffix, &self.excluded_dirs)
    }

    /// Manifest files under `root`. No directories are pruned.
    pub fn manifests(&self, root: &Path) -> Vec<Unit> {
        self.find(root, &self.manifest_suffix, &[])
    }

    /// Descriptor files under `<theme_root>/themes`.
    pub fn theme_descriptors(&self, theme_root: &Path) -> Vec<Unit> {
        self.descriptors(&theme_root.join("themes"))
    }

    /// The selectable units for a section. Manifests come before descriptors.
    /// Relative property paths are taken from `project_dir`.
    pub fn options(
        &self,
        section: Section,
        properties: &PropertyBag,
        project_dir: &Path,
    ) -> Result<Vec<Unit>> {
        let resolve = |key: &str| -> Result<PathBuf> { Ok(project_dir.join(properties.require(key)?)) };

        let units = match section {
            Section::Theme => self.theme_descriptors(&resolve("theme.dir")?),
            Section::Default => {
                let mut units = self.manifests(&resolve("resources.dir")?);
                units.extend(self.descriptors(&resolve("lib.dir")?));
                units
            }
        };
        tracing::debug!(?section, count = units.len(), "discovered units");
        Ok(units)
    }

    /// Directory names holding descriptors under `unit_dir` that belong to
    /// some other unit than `unit_stem`, so checks can skip nested modules.
    ///
    /// Each foreign descriptor contributes the name of its own directory, in
    /// path order, without duplicates. Descriptors lying directly in
    /// `unit_dir` contribute nothing.
    pub fn excluded_subdirectories(&self, unit_stem: &str, unit_dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for unit in self.find(unit_dir, &self.descriptor_suffix, &[]) {
            if unit.stem() == unit_stem {
                continue;
            }
            let Some(parent) = unit.path.parent() else {
                continue;
            };
            if same_dir(parent, unit_dir) {
                continue;
            }
            if let Some(name) = parent.file_name().map(|n| n.to_string_lossy().to_string())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    fn find(&self, root: &Path, suffix: &str, excluded: &[String]) -> Vec<Unit> {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "search root missing, no units");
            return Vec::new();
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e, excluded))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext.to_string_lossy() == suffix))
            .map(|e| {
                e.path()
                    .canonicalize()
                    .unwrap_or_else(|_| e.path().to_path_buf())
            })
            .collect();
        // Whole-path byte order, so `b-c/` sorts before `b/`.
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        paths
            .into_iter()
            .map(|path| Unit {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                kind: self.kind_of(&path),
                path,
            })
            .collect()
    }
}

fn is_excluded_dir(entry: &DirEntry, excluded: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && excluded
            .iter()
            .any(|name| entry.file_name().to_string_lossy() == name.as_str())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
