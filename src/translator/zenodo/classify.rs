use once_cell::sync::Lazy;
use scraper::Selector;

use crate::{
    config::Config,
    document::{Document, text_content},
    item::ItemType,
    translator::PageKind,
};

use super::listing;

static RESOURCE_TYPE_BADGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[aria-label="Resource type"]"#).unwrap());

/// Record pages are recognised by this path marker.
const RECORD_PATH: &str = "/records/";

/// Record pages are classified by their badges; anything else is a listing if it has results.
pub fn detect(doc: &Document, config: &Config) -> Option<PageKind> {
    if doc.url().as_str().contains(RECORD_PATH) {
        Some(PageKind::Record(classify(doc, config)))
    } else if listing::is_listing(doc) {
        Some(PageKind::Multiple)
    } else {
        None
    }
}

/// Item type from the first recognised resource-type badge, in document order.
pub fn classify(doc: &Document, config: &Config) -> ItemType {
    doc.select(&RESOURCE_TYPE_BADGE)
        .find_map(|badge| {
            let label = text_content(&badge).to_lowercase();
            map_label(label.trim(), config)
        })
        .unwrap_or(ItemType::JournalArticle)
}

fn map_label(label: &str, config: &Config) -> Option<ItemType> {
    let item_type = match label {
        "software" => ItemType::ComputerProgram,
        // Could be audio as well; the badge doesn't say.
        "video/audio" => ItemType::VideoRecording,
        "figure" | "drawing" | "photo" | "diagram" | "plot" => ItemType::Artwork,
        "presentation" | "conference paper" | "poster" | "lesson" => ItemType::Presentation,
        "book" => ItemType::Book,
        "book section" => ItemType::BookSection,
        "patent" => ItemType::Patent,
        "report" | "working paper" | "project deliverables" => ItemType::Report,
        "preprint" => ItemType::Preprint,
        "thesis" => ItemType::Thesis,
        "dataset" => config.dataset_type(),
        "journal article" => ItemType::JournalArticle,
        _ => return None,
    };
    Some(item_type)
}
