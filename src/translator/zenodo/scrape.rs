use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{Config, DatasetSupport},
    csl,
    document::Document,
    fetch::Fetch,
    item::{Attachment, Item, ItemType, Note},
    utilities::{clean_author, derive_short_title, str_to_iso},
};

use super::classify;

/// Metadata read straight from the record page's `<meta>` tags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageMetadata {
    pub abstract_note: Option<String>,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub keywords: Vec<String>,
}

impl PageMetadata {
    pub fn read(doc: &Document) -> Self {
        PageMetadata {
            abstract_note: doc.meta_content("description"),
            doi: doc.meta_content("citation_doi"),
            pdf_url: doc.meta_content("citation_pdf_url"),
            keywords: doc.meta_contents("citation_keywords"),
        }
    }
}

/// The record's CSL-JSON export: fragment, query and any existing `/export/…` tail removed.
pub fn export_url(url: &Url) -> anyhow::Result<Url> {
    static FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.+").unwrap());
    static QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?.+").unwrap());
    static EXPORT_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/export/.+").unwrap());

    let base = FRAGMENT.replace(url.as_str(), "");
    let base = QUERY.replace(&base, "");
    let base = EXPORT_TAIL.replace(&base, "");
    let export = format!("{base}/export/csl");
    Url::parse(&export).with_context(|| format!("invalid export URL {export}"))
}

/// Rewrite the snake_case keys the site emits to their CSL spelling.
pub fn patch_export(text: &str) -> String {
    static PUBLISHER_PLACE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#""publisher_place"(\s*:)"#).unwrap());
    static CONTAINER_TITLE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#""container_title"(\s*:)"#).unwrap());

    let text = PUBLISHER_PLACE.replace_all(text, "\"publisher-place\"$1");
    CONTAINER_TITLE
        .replace_all(&text, "\"container-title\"$1")
        .into_owned()
}

/// Fetch, import and correct the record shown by `doc`.
pub fn scrape(doc: &Document, fetcher: &dyn Fetch, config: &Config) -> anyhow::Result<Vec<Item>> {
    let page = PageMetadata::read(doc);
    let export = export_url(doc.url())?;
    debug!(%export, "fetching CSL export");
    let text = fetcher
        .text(&export)
        .with_context(|| format!("failed to fetch CSL export for {}", doc.url()))?;

    let mut items = csl::import(&patch_export(&text))?;
    match items.len() {
        0 => anyhow::bail!("empty CSL export at {export}"),
        1 => {}
        n => warn!(%export, count = n, "CSL export held more than one record"),
    }

    let item_type = classify::classify(doc, config);
    for item in &mut items {
        correct(item, item_type, &page, doc.url(), config);
    }
    Ok(items)
}

/// Apply the record-page corrections to an imported item, in order.
pub fn correct(item: &mut Item, item_type: ItemType, page: &PageMetadata, url: &Url, config: &Config) {
    item.set_item_type(item_type);

    // The import puts CSL `note` into extra; keep it as a real note instead.
    if let Some(extra) = item.extra.take().filter(|e| !e.is_empty()) {
        item.notes.push(Note { note: extra });
    }

    if let Some(doi) = page.doi.as_deref() {
        if !item.item_type.has_doi_field() {
            item.extra = Some(format!("DOI: {doi}"));
        } else if item.doi.is_none() {
            item.doi = Some(doi.to_string());
        }
    }

    if config.dataset_support == DatasetSupport::Fallback
        && item.item_type == config.dataset_type()
    {
        item.push_extra("Type: dataset");
    }

    let attachment = match page.pdf_url.as_deref() {
        Some(pdf) => Attachment {
            url: pdf.to_string(),
            title: format!("{} Full Text PDF", config.site_name),
            mime_type: "application/pdf".to_string(),
        },
        None => Attachment {
            url: url.to_string(),
            title: format!("{} Snapshot", config.site_name),
            mime_type: "text/html".to_string(),
        },
    };
    item.attachments.push(attachment);

    item.tags.extend(page.keywords.iter().cloned());

    repair_creators(item);

    // The repository is where the work is archived, not who granted or issued it.
    match item.item_type {
        ItemType::Thesis if item.publisher.as_deref() == Some(config.site_name.as_str()) => {
            item.publisher = None;
            item.archive = Some(config.site_name.clone());
        }
        ItemType::Report if item.publisher.as_deref() == Some(config.site_name.as_str()) => {
            item.publisher = None;
        }
        _ => {}
    }

    if let Some(date) = item.date.take() {
        item.date = Some(str_to_iso(&date).unwrap_or(date));
    }

    let mut canonical = url.clone();
    canonical.set_fragment(None);
    item.url = Some(canonical.to_string());

    if let Some(abstract_note) = page.abstract_note.as_deref() {
        item.abstract_note = Some(abstract_note.to_string());
    }

    if item.short_title.is_none() {
        item.short_title = item.title.as_deref().and_then(derive_short_title);
    }
    item.library_catalog = Some(config.site_name.clone());
    item.item_id = None;
}

/// Split creators that came through with only a combined name.
fn repair_creators(item: &mut Item) {
    for creator in &mut item.creators {
        if creator.first_name.is_empty() {
            if let Some((last, first)) = creator.last_name.split_once(',') {
                let (last, first) = (last.trim().to_string(), first.trim().to_string());
                creator.last_name = last;
                creator.first_name = first;
            } else {
                *creator = clean_author(&creator.last_name, &creator.creator_type);
            }
        }
        creator.creator_type_id = None;
    }
}
