use std::fmt;

use regex::Regex;

use crate::{
    document::Document,
    fetch::Fetch,
    item::{Item, ItemType},
    select::ItemSelector,
};

pub mod zenodo;

/// What a translator recognises a page as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A single record of the given type.
    Record(ItemType),
    /// A listing of several records.
    Multiple,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Record(t) => f.write_str(t.as_str()),
            PageKind::Multiple => f.write_str("multiple"),
        }
    }
}

/// Finalized items and per-item failures from one run.
#[derive(Debug, Default)]
pub struct Harvest {
    pub items: Vec<Item>,
    pub failures: Vec<(String, anyhow::Error)>,
}

impl Harvest {
    pub fn extend(&mut self, other: Harvest) {
        self.items.extend(other.items);
        self.failures.extend(other.failures);
    }
}

pub trait Translator {
    /// Pattern of URLs this translator handles.
    fn target(&self) -> &Regex;

    /// Classify a page, or `None` when it holds nothing to import.
    fn detect_web(&self, doc: &Document) -> Option<PageKind>;

    /// Import everything the page offers. Item-level failures end up in the harvest.
    fn do_web(
        &self,
        doc: &Document,
        fetcher: &dyn Fetch,
        selector: &mut dyn ItemSelector,
    ) -> anyhow::Result<Harvest>;
}
