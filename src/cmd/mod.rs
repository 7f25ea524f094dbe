//! CLI command implementations.
//!
//! | Module    | Commands handled  |
//! |-----------|-------------------|
//! | `review`  | `Review`          |
//! | `checks`  | `Checks`, `Check` |
//! | `config`  | `Config`          |

pub mod checks;
pub mod config;
pub mod review;

pub use checks::{cmd_check, cmd_checks};
pub use config::cmd_config;
pub use review::cmd_review;

use anyhow::Result;
use qa_review::checks::CheckRegistry;
use qa_review::qa_config::QaConfig;
use std::path::PathBuf;

/// Load `qa.toml` and register its checks.
pub(crate) fn load(cli: &crate::Cli, project_dir: PathBuf) -> Result<(QaConfig, CheckRegistry)> {
    let config = QaConfig::with_cli_args(project_dir, cli.define.clone())?;
    let registry = CheckRegistry::from_definitions(&config.toml.checks, &config.project_dir)?;
    Ok((config, registry))
}
