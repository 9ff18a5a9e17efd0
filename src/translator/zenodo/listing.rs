use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::{
    document::{Document, text_content},
    utilities::trim_internal,
};

static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"section[aria-label="Search results"] h2 a"#).unwrap());

/// `link → title` for every search result with both a link and a title.
pub fn search_results(doc: &Document) -> BTreeMap<String, String> {
    doc.select(&RESULT_LINK)
        .filter_map(|a| {
            let href = doc.href(&a)?;
            let title = trim_internal(&text_content(&a));
            (!title.is_empty()).then(|| (href.to_string(), title))
        })
        .collect()
}

pub fn is_listing(doc: &Document) -> bool {
    !search_results(doc).is_empty()
}
