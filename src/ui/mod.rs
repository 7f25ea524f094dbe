pub mod icons;

use crate::review::BuildResult;
use console::style;
use icons::{CHECK, CROSS, REVIEW};

/// Banner printed before a review starts.
pub fn review_banner(review_type: impl std::fmt::Display, checks: usize) -> String {
    let noun = if checks == 1 { "check" } else { "checks" };
    format!(
        "{}Reviewing {} build with {} {}",
        REVIEW,
        style(review_type).bold(),
        checks,
        noun
    )
}

/// One-line verdict shown after the report.
pub fn summary_line(result: BuildResult) -> String {
    match result {
        BuildResult::Passed => format!("{}{}", CHECK, style("All checks passed").green().bold()),
        BuildResult::Failed => format!("{}{}", CROSS, style("Review failed").red().bold()),
    }
}
