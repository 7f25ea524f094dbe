//! Review command: `qa review`.

use anyhow::{Context, Result};
use qa_review::properties::{PropertyStore, ReviewType};
use qa_review::review::{ReviewController, ReviewOptions};
use qa_review::select::{PromptSelector, Selector};
use qa_review::ui;
use std::path::PathBuf;
use std::process::ExitCode;

pub async fn cmd_review(
    cli: &crate::Cli,
    project_dir: PathBuf,
    review_type: ReviewType,
    mut options: ReviewOptions,
) -> Result<ExitCode> {
    let (config, registry) = super::load(cli, project_dir)?;

    let store = PropertyStore::load(
        &config.project_dir,
        &config.toml.properties.files,
        &config.property_overrides,
    )?;
    let properties = store.settings_for(review_type)?;

    // dialoguer needs a terminal on stderr to draw its prompt.
    if !options.non_interactive && !console::user_attended_stderr() {
        tracing::info!("stderr is not a terminal, selecting everything");
        options.non_interactive = true;
    }

    let cwd = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .context("Failed to get current directory")?;

    let reviewable = registry
        .reviewable(&config.review().all_excluded_checks())
        .len();
    eprintln!("{}", ui::review_banner(review_type, reviewable));

    let selector: Box<dyn Selector> = Box::new(PromptSelector);
    let mut controller = ReviewController::new(
        &registry,
        properties,
        config.review().clone(),
        config.project_dir.clone(),
        selector,
        std::io::stdout(),
    )
    .with_cwd(cwd);

    let result = controller.run(options).await?;

    eprintln!("{}", ui::summary_line(result));
    Ok(ExitCode::from(result.exit_code()))
}
