//! Check registry boundary.
//!
//! The orchestrator never knows what a check does. It only reads a check's
//! name, its category and the set of parameter names it accepts, and it runs
//! the check with an [`Invocation`] against an output sink, getting an exit
//! status back.
//!
//! # Configuration
//!
//! Checks are declared in `qa.toml`:
//!
//! ```toml
//! [[checks]]
//! name = "phpcs:module"
//! command = "./vendor/bin/phpcs-review"
//! params = ["directory", "standard", "exclude-dirs"]
//!
//! [[checks]]
//! name = "theme:conflict"
//! command = "./scripts/theme-conflict.sh"
//! ```
//!
//! Each definition becomes an [`ExternalCheck`]; tests register in-memory
//! implementations of [`Check`] directly.

pub mod config;
pub mod external;
pub mod registry;

pub use config::{Category, CheckDefinition, validate_checks};
pub use external::ExternalCheck;
pub use registry::CheckRegistry;

use crate::errors::ReviewError;
use async_trait::async_trait;
use std::io::Write;

/// Output sink shared by all checks of one batch.
pub type Sink = dyn Write + Send;

/// A registered quality check.
#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Parameter names this check accepts, in declaration order.
    fn accepted_params(&self) -> &[String];

    fn description(&self) -> Option<&str> {
        None
    }

    fn accepts(&self, param: &str) -> bool {
        self.accepted_params().iter().any(|p| p == param)
    }

    /// Run the check, writing its report to `sink`. Returns the exit status.
    async fn run(&self, invocation: &Invocation, sink: &mut Sink) -> Result<i32, ReviewError>;
}

/// A check name bound to concrete arguments for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub check: String,
    pub args: Vec<(String, String)>,
}

impl Invocation {
    /// An invocation without arguments.
    pub fn bare(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Arguments rendered as `--name=value` command line options.
    pub fn cli_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|(k, v)| format!("--{}={}", k, v))
            .collect()
    }
}
