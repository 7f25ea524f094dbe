//! Configuration view and validation commands: `qa config`.

use anyhow::Result;
use qa_review::qa_config::{CONFIG_FILE, QaToml, ReviewSection};
use qa_review::ui::icons::{CHECK, WARN};

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = project_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("QA Configuration");
            println!("================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                QaToml::load(&config_path)?
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
                QaToml::default()
            };
            println!();

            print_review_section(&toml.review);

            println!("[properties]");
            let files: Vec<String> = toml
                .properties
                .files
                .iter()
                .map(|f| format!("\"{}\"", f.display()))
                .collect();
            println!("  files = [{}]", files.join(", "));
            println!();

            if toml.checks.is_empty() {
                println!("No checks registered.");
                println!("Run 'qa config init' to create a {} with the standard checks.", CONFIG_FILE);
            } else {
                println!("Checks:");
                for check in &toml.checks {
                    let state = if check.enabled { "" } else { " (disabled)" };
                    println!(
                        "  {} [{}]{}",
                        check.name,
                        check.resolved_category(),
                        state
                    );
                    if let Some(command) = &check.command {
                        println!("    command = \"{}\"", command);
                    }
                    if !check.params.is_empty() {
                        println!("    params = [{}]", check.params.join(", "));
                    }
                }
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!(
                    "{}No {} found. Defaults register no checks, so reviews cannot run.",
                    WARN, CONFIG_FILE
                );
                return Ok(());
            }

            let toml = QaToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("{}Configuration is valid.", CHECK);
            } else {
                println!("{}Configuration warnings:", WARN);
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            QaToml::starter().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [review] excluded_dirs, post_check, starter_kit_check");
            println!("  - [properties] files");
            println!("  - [[checks]] command and params for each check");
            println!();
        }
    }

    Ok(())
}

fn print_review_section(review: &ReviewSection) {
    println!("[review]");
    println!("  ruler_min = {}", review.ruler_min);
    println!("  descriptor_suffix = \"{}\"", review.descriptor_suffix);
    println!("  manifest_suffix = \"{}\"", review.manifest_suffix);
    println!("  excluded_dirs = {:?}", review.excluded_dirs);
    println!("  excluded_checks = {:?}", review.excluded_checks);
    println!("  starter_kit_check = \"{}\"", review.starter_kit_check);
    println!("  post_check = \"{}\"", review.post_check);
    println!("  keep_unmatched_checks = {}", review.keep_unmatched_checks);
    println!();
}
