//! Operator selection of units and checks.
//!
//! Every prompt lists a synthetic [`SELECT_ALL`] entry first. Picking it, or
//! running without interaction, selects every real option.

use anyhow::Result;
use dialoguer::{MultiSelect, theme::ColorfulTheme};

pub const SELECT_ALL: &str = "Select all";

pub const UNIT_PROMPT: &str = "Select features, modules and/or themes to QA";
pub const CHECK_PROMPT: &str = "Select checks to execute in review";

/// Source of operator choices.
pub trait Selector {
    /// Pick entries from `options` (index 0 is always [`SELECT_ALL`]).
    /// Returns the chosen indices.
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Vec<usize>>;
}

/// Terminal multi-select prompt. "Select all" is pre-checked.
pub struct PromptSelector;

impl Selector for PromptSelector {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Vec<usize>> {
        let mut defaults = vec![false; options.len()];
        if let Some(first) = defaults.first_mut() {
            *first = true;
        }

        let selection = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(options)
            .defaults(&defaults)
            .interact()?;
        Ok(selection)
    }
}

/// Never prompts; always answers "Select all".
pub struct NonInteractive;

impl Selector for NonInteractive {
    fn choose(&mut self, _prompt: &str, _options: &[String]) -> Result<Vec<usize>> {
        Ok(vec![0])
    }
}

/// Ask `selector` to pick among `items` and return the chosen ones in their
/// original order.
pub fn select_from<T>(
    selector: &mut dyn Selector,
    prompt: &str,
    items: Vec<T>,
    label: impl Fn(&T) -> String,
) -> Result<Vec<T>> {
    let mut options = Vec::with_capacity(items.len() + 1);
    options.push(SELECT_ALL.to_string());
    options.extend(items.iter().map(&label));

    let picked = selector.choose(prompt, &options)?;
    if picked.contains(&0) {
        return Ok(items);
    }

    Ok(items
        .into_iter()
        .enumerate()
        .filter(|(i, _)| picked.contains(&(i + 1)))
        .map(|(_, item)| item)
        .collect())
}
