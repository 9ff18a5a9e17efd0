use std::collections::BTreeMap;

use dialoguer::{MultiSelect, theme::ColorfulTheme};

/// Chooses which entries of a listing to import.
pub trait ItemSelector {
    /// Given `link → title`, return the chosen links, or `None` when the user declines.
    fn select(&mut self, items: &BTreeMap<String, String>) -> anyhow::Result<Option<Vec<String>>>;
}

/// Accepts every entry without asking.
pub struct SelectAll;

impl ItemSelector for SelectAll {
    fn select(&mut self, items: &BTreeMap<String, String>) -> anyhow::Result<Option<Vec<String>>> {
        Ok(Some(items.keys().cloned().collect()))
    }
}

/// Interactive checkbox prompt on the terminal.
pub struct PromptSelector;

impl ItemSelector for PromptSelector {
    fn select(&mut self, items: &BTreeMap<String, String>) -> anyhow::Result<Option<Vec<String>>> {
        let links: Vec<&String> = items.keys().collect();
        let titles: Vec<&String> = items.values().collect();
        let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Select items to import (Space to toggle, Enter to confirm)")
            .items(&titles)
            .interact_opt()?;
        Ok(chosen
            .filter(|idx| !idx.is_empty())
            .map(|idx| idx.into_iter().map(|i| links[i].clone()).collect()))
    }
}
