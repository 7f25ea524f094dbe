use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qa_review::discovery::Section;
use qa_review::properties::ReviewType;
use std::path::PathBuf;
use std::process::ExitCode;

mod cmd;

#[derive(Parser)]
#[command(name = "qa")]
#[command(version, about = "Quality assurance review runner for Drupal platform builds")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Override a build property (repeatable), e.g. -D profile=standard
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", global = true)]
    pub define: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review modules, features, themes and build manifests
    Review {
        /// Build type whose properties are resolved
        #[arg(long = "type", value_enum, default_value_t = ReviewType::Platform)]
        review_type: ReviewType,

        /// Choose which checks to run
        #[arg(long)]
        select: bool,

        /// Review everything without prompting
        #[arg(long)]
        no_interaction: bool,

        /// Which units to offer
        #[arg(long, value_enum, default_value_t = Section::Default)]
        section: Section,
    },
    /// List registered checks
    Checks {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a single check and exit with its status
    Check {
        name: String,

        /// Argument passed to the check (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a qa.toml file with the standard checks
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    qa_review::logging::init(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Review {
            review_type,
            select,
            no_interaction,
            section,
        } => {
            let options = qa_review::review::ReviewOptions {
                section: *section,
                select_checks: *select,
                non_interactive: *no_interaction,
            };
            cmd::cmd_review(&cli, project_dir, *review_type, options).await
        }
        Commands::Checks { json } => {
            cmd::cmd_checks(&cli, project_dir, *json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { name, params } => cmd::cmd_check(&cli, project_dir, name, params).await,
        Commands::Config { command } => {
            cmd::cmd_config(&project_dir, command.clone())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
