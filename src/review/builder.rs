//! Per-unit invocation building.
//!
//! Every unit gets one shared parameter set; each check then receives the
//! subset of it whose names the check declares.

use crate::checks::{Check, Invocation};
use crate::discovery::{Discovery, UnitKind};
use crate::errors::PropertyError;
use crate::properties::{PROJECT_BASEDIR, PropertyBag};
use std::path::Path;

/// Every parameter name a check may declare, in the order arguments are passed.
pub const SHARED_PARAMS: &[&str] = &[
    "directory",
    "filename",
    "profile",
    "standard",
    PROJECT_BASEDIR,
    "exclude-dirs",
];

/// Builds the invocations for one review run.
pub struct CommandLineBuilder<'a> {
    properties: &'a PropertyBag,
    discovery: &'a Discovery,
    keep_unmatched: bool,
}

impl<'a> CommandLineBuilder<'a> {
    pub fn new(properties: &'a PropertyBag, discovery: &'a Discovery) -> Self {
        Self {
            properties,
            discovery,
            keep_unmatched: true,
        }
    }

    /// Whether checks declaring none of the shared parameters still get an
    /// (argument-less) invocation.
    pub fn keep_unmatched(mut self, keep: bool) -> Self {
        self.keep_unmatched = keep;
        self
    }

    /// The shared parameter set for `unit_path`.
    ///
    /// `filename` is the stem for descriptors and the full path for
    /// manifests. `exclude-dirs` is only present when the unit directory
    /// contains other units.
    pub fn shared_params(&self, unit_path: &Path) -> Result<Vec<(String, String)>, PropertyError> {
        let directory = unit_path.parent().unwrap_or_else(|| Path::new("/"));
        let filename = match self.discovery.kind_of(unit_path) {
            UnitKind::Manifest => unit_path.to_string_lossy().to_string(),
            UnitKind::Descriptor => unit_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        let mut params = vec![
            ("directory".to_string(), directory.to_string_lossy().to_string()),
            ("filename".to_string(), filename.clone()),
            ("profile".to_string(), self.properties.require("profile")?.to_string()),
            (
                "standard".to_string(),
                self.properties.require("phpcs.config")?.to_string(),
            ),
            (
                PROJECT_BASEDIR.to_string(),
                self.properties.require(PROJECT_BASEDIR)?.to_string(),
            ),
        ];

        let excluded = self.discovery.excluded_subdirectories(&filename, directory);
        if !excluded.is_empty() {
            params.push(("exclude-dirs".to_string(), excluded.join(",")));
        }
        Ok(params)
    }

    /// One invocation per check, in check order, carrying only the shared
    /// parameters the check declares.
    pub fn build(
        &self,
        unit_path: &Path,
        checks: &[&dyn Check],
    ) -> Result<Vec<Invocation>, PropertyError> {
        let shared = self.shared_params(unit_path)?;

        let invocations: Vec<Invocation> = checks
            .iter()
            .filter_map(|check| {
                let args: Vec<(String, String)> = shared
                    .iter()
                    .filter(|(name, _)| check.accepts(name))
                    .cloned()
                    .collect();
                if args.is_empty() && !self.keep_unmatched {
                    tracing::debug!(check = check.name(), "no shared parameters accepted, skipping");
                    return None;
                }
                Some(Invocation {
                    check: check.name().to_string(),
                    args,
                })
            })
            .collect();

        tracing::debug!(
            unit = %unit_path.display(),
            count = invocations.len(),
            "built invocations"
        );
        Ok(invocations)
    }
}
