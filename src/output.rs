use std::io::Write;

use anyhow::Context;
use tracing::warn;

use crate::{cli::OutputFormat, item::Item, translator::Harvest};

/// Write every item in `format`.
///
/// An item that cannot be rendered is moved from `items` to `failures` and the rest are still
/// written, so the summary counts it like any other failed item.
pub fn write_items<W: Write>(
    harvest: &mut Harvest,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let items: Vec<_> = harvest.items.iter().map(Item::to_json).collect();
            if !items.is_empty() {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)
                    .context("failed to write output")?;
            }
        }
        OutputFormat::Biblatex => {
            for entry in render_each(harvest, Item::to_biblatex) {
                writeln!(out, "{entry}").context("failed to write output")?;
            }
        }
    }
    Ok(())
}

fn render_each<F>(harvest: &mut Harvest, mut render: F) -> Vec<String>
where
    F: FnMut(&Item) -> anyhow::Result<String>,
{
    let mut rendered = Vec::new();
    for item in std::mem::take(&mut harvest.items) {
        match render(&item) {
            Ok(entry) => {
                rendered.push(entry);
                harvest.items.push(item);
            }
            Err(err) => {
                let label = item
                    .url
                    .clone()
                    .or_else(|| item.title.clone())
                    .unwrap_or_else(|| item.item_type.to_string());
                warn!(item = %label, error = %format!("{err:#}"), "render failed");
                harvest.failures.push((label, err));
            }
        }
    }
    rendered
}
