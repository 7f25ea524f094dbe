use super::config::{Category, CheckDefinition};
use super::external::ExternalCheck;
use super::Check;
use crate::errors::ReviewError;
use std::path::Path;

/// Ordered collection of registered checks, looked up by name.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of external checks from `qa.toml` definitions.
    /// Disabled definitions are skipped.
    pub fn from_definitions(
        definitions: &[CheckDefinition],
        project_dir: &Path,
    ) -> Result<Self, ReviewError> {
        let mut registry = Self::new();
        for definition in definitions.iter().filter(|d| d.enabled) {
            registry.register(Box::new(ExternalCheck::from_definition(
                definition,
                project_dir,
            )?))?;
        }
        tracing::debug!(count = registry.len(), "registered checks");
        Ok(registry)
    }

    pub fn register(&mut self, check: Box<dyn Check>) -> Result<(), ReviewError> {
        if self.checks.iter().any(|c| c.name() == check.name()) {
            return Err(ReviewError::DuplicateCheck {
                name: check.name().to_string(),
            });
        }
        self.checks.push(check);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<&dyn Check, ReviewError> {
        self.checks
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
            .ok_or_else(|| ReviewError::UnknownCheck {
                name: name.to_string(),
            })
    }

    /// All registered checks in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// Checks eligible for per-unit review: category `check` and not named in
    /// `excluded`.
    pub fn reviewable<'a>(&'a self, excluded: &'a [String]) -> Vec<&'a dyn Check> {
        self.all()
            .filter(|c| c.category() == Category::Check)
            .filter(|c| !excluded.iter().any(|name| name == c.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
