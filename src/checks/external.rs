//! Checks backed by an external shell command.
//!
//! The command runs through `sh -c` with the invocation arguments appended as
//! `--name=value` options. Every argument is also exported as an environment
//! variable (`directory` becomes `QA_DIRECTORY`, `project.basedir` becomes
//! `QA_PROJECT_BASEDIR`). Captured stdout, then stderr, are written to the sink.

use super::config::{Category, CheckDefinition};
use super::{Check, Invocation, Sink};
use crate::errors::ReviewError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub struct ExternalCheck {
    name: String,
    command: String,
    params: Vec<String>,
    category: Category,
    description: Option<String>,
    working_dir: PathBuf,
}

impl ExternalCheck {
    /// Build a check from its definition. Relative working directories are
    /// resolved against `project_dir`.
    pub fn from_definition(
        definition: &CheckDefinition,
        project_dir: impl AsRef<Path>,
    ) -> Result<Self, ReviewError> {
        let command = definition
            .command
            .as_ref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ReviewError::MissingCommand {
                name: definition.name.clone(),
            })?;

        let project_dir = project_dir.as_ref();
        let working_dir = definition
            .working_dir
            .as_ref()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    project_dir.join(p)
                }
            })
            .unwrap_or_else(|| project_dir.to_path_buf());

        Ok(Self {
            name: definition.name.clone(),
            command: command.clone(),
            params: definition.params.clone(),
            category: definition.resolved_category(),
            description: definition.description.clone(),
            working_dir,
        })
    }
}

/// Environment variable name for a parameter.
pub fn env_key(param: &str) -> String {
    let mut key = String::from("QA_");
    for ch in param.chars() {
        if ch.is_ascii_alphanumeric() {
            key.push(ch.to_ascii_uppercase());
        } else {
            key.push('_');
        }
    }
    key
}

#[async_trait]
impl Check for ExternalCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn accepted_params(&self) -> &[String] {
        &self.params
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn run(&self, invocation: &Invocation, sink: &mut Sink) -> Result<i32, ReviewError> {
        tracing::debug!(
            check = %self.name,
            args = ?invocation.cli_args(),
            dir = %self.working_dir.display(),
            "running check"
        );

        // "$@" forwards the positional arguments that follow the script name.
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("{} \"$@\"", self.command))
            .arg(&self.name)
            .args(invocation.cli_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("QA_CHECK", &self.name);
        for (name, value) in &invocation.args {
            cmd.env(env_key(name), value);
        }

        let output = cmd
            .output()
            .await
            .map_err(|source| ReviewError::SpawnFailed {
                name: self.name.clone(),
                source,
            })?;

        sink.write_all(&output.stdout)
            .map_err(ReviewError::OutputFailed)?;
        sink.write_all(&output.stderr)
            .map_err(ReviewError::OutputFailed)?;

        // Killed by a signal: no code, count it as a failure.
        let status = output.status.code().unwrap_or(1);
        tracing::debug!(check = %self.name, status, "check finished");
        Ok(status)
    }
}
