//! Check listing and direct execution: `qa checks`, `qa check`.

use anyhow::{Context, Result};
use console::style;
use qa_review::checks::{Check, Invocation};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
struct CheckSummary<'a> {
    name: &'a str,
    category: String,
    params: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> CheckSummary<'a> {
    fn of(check: &'a dyn Check) -> Self {
        Self {
            name: check.name(),
            category: check.category().to_string(),
            params: check.accepted_params(),
            description: check.description(),
        }
    }
}

pub fn cmd_checks(cli: &crate::Cli, project_dir: PathBuf, json: bool) -> Result<()> {
    let (config, registry) = super::load(cli, project_dir)?;
    let summaries: Vec<CheckSummary> = registry.all().map(CheckSummary::of).collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("Failed to serialize checks")?
        );
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No checks registered in {}", config.config_path().display());
        println!("Run 'qa config init' to create one with the standard checks.");
        return Ok(());
    }

    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for summary in &summaries {
        println!(
            "{}  {:<5}  {}",
            style(format!("{:<width$}", summary.name, width = width)).bold(),
            summary.category,
            summary.description.unwrap_or("")
        );
        if !summary.params.is_empty() {
            println!("{:<width$}  params: {}", "", summary.params.join(", "), width = width);
        }
    }
    Ok(())
}

pub async fn cmd_check(
    cli: &crate::Cli,
    project_dir: PathBuf,
    name: &str,
    params: &[String],
) -> Result<ExitCode> {
    let (_config, registry) = super::load(cli, project_dir)?;
    let check = registry.find(name)?;

    let args = params
        .iter()
        .map(|raw| parse_param(raw))
        .collect::<Result<Vec<_>>>()?;
    let invocation = Invocation {
        check: name.to_string(),
        args,
    };

    let mut out = std::io::stdout();
    let status = check.run(&invocation, &mut out).await?;
    tracing::debug!(check = name, status, "check finished");
    Ok(ExitCode::from(u8::try_from(status).unwrap_or(1)))
}

fn parse_param(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("Malformed parameter '{}': expected key=value", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("directory=/a/b=c").unwrap(),
            ("directory".to_string(), "/a/b=c".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
