//! Import of CSL-JSON exports into [`Item`]s.
//!
//! Field names are matched exactly as the CSL-JSON schema spells them (`container-title`,
//! `publisher-place`, ...). Anything else is ignored.

use anyhow::Context;
use serde::Deserialize;

use crate::item::{Creator, Item, ItemType};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CslItem>),
    One(Box<CslItem>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct CslItem {
    id: Option<Scalar>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    title: Option<String>,
    title_short: Option<String>,
    container_title: Option<String>,
    publisher: Option<String>,
    publisher_place: Option<String>,
    volume: Option<Scalar>,
    issue: Option<Scalar>,
    page: Option<Scalar>,
    version: Option<Scalar>,
    language: Option<String>,
    note: Option<String>,
    #[serde(rename = "abstract")]
    abstract_note: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "ISBN")]
    isbn: Option<String>,
    #[serde(rename = "ISSN")]
    issn: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    author: Vec<CslName>,
    editor: Vec<CslName>,
    translator: Vec<CslName>,
    contributor: Vec<CslName>,
    issued: Option<CslDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct CslName {
    family: Option<String>,
    given: Option<String>,
    literal: Option<String>,
    non_dropping_particle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct CslDate {
    date_parts: Vec<Vec<Scalar>>,
    raw: Option<String>,
    literal: Option<String>,
}

/// CSL allows numbers or strings for most numeric variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// Parse a CSL-JSON document (a single object or an array) into items.
pub fn import(text: &str) -> anyhow::Result<Vec<Item>> {
    let parsed: OneOrMany = serde_json::from_str(text).context("failed to parse CSL-JSON")?;
    let items = match parsed {
        OneOrMany::Many(v) => v,
        OneOrMany::One(one) => vec![*one],
    };
    Ok(items.into_iter().map(CslItem::into_item).collect())
}

impl CslItem {
    fn into_item(self) -> Item {
        let item_type = self
            .item_type
            .as_deref()
            .map(ItemType::from_csl)
            .unwrap_or(ItemType::Document);
        let mut item = Item::new(item_type);

        // The second element is the role's internal id.
        let roles = [
            (item_type.primary_creator_type(), 0u8, self.author),
            ("editor", 1, self.editor),
            ("translator", 2, self.translator),
            ("contributor", 3, self.contributor),
        ];
        for (role, id, names) in roles {
            item.creators
                .extend(names.into_iter().map(|n| n.into_creator(role, id)));
        }

        item.item_id = self.id.map(Scalar::into_text);
        item.title = self.title;
        item.short_title = self.title_short;
        item.publication_title = self.container_title;
        item.publisher = self.publisher;
        item.place = self.publisher_place;
        item.volume = self.volume.map(Scalar::into_text);
        item.issue = self.issue.map(Scalar::into_text);
        item.pages = self.page.map(Scalar::into_text);
        item.version_number = self.version.map(Scalar::into_text);
        item.language = self.language;
        // CSL `note` is the free-text "extra" slot.
        item.extra = self.note;
        item.abstract_note = self.abstract_note;
        item.doi = self.doi.filter(|_| item_type.has_doi_field());
        item.isbn = self.isbn;
        item.issn = self.issn;
        item.url = self.url;
        item.date = self.issued.and_then(CslDate::into_text);
        item
    }
}

impl CslName {
    fn into_creator(self, role: &str, role_id: u8) -> Creator {
        let mut creator = match (self.literal, self.family) {
            (Some(literal), _) => Creator::new("", &literal, role),
            (None, family) => {
                let family = family.unwrap_or_default();
                let last = match self.non_dropping_particle {
                    Some(particle) => format!("{particle} {family}"),
                    None => family,
                };
                Creator::new(self.given.as_deref().unwrap_or_default(), &last, role)
            }
        };
        creator.creator_type_id = Some(role_id);
        creator
    }
}

impl CslDate {
    /// Unpadded `Y-M-D` from `date-parts`, else the raw or literal string.
    fn into_text(self) -> Option<String> {
        if let Some(parts) = self.date_parts.into_iter().next().filter(|p| !p.is_empty()) {
            let text = parts
                .into_iter()
                .map(Scalar::into_text)
                .collect::<Vec<_>>()
                .join("-");
            return Some(text);
        }
        self.raw.or(self.literal)
    }
}
