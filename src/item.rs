use std::{collections::BTreeSet, fmt};

use anyhow::anyhow;
use biblatex::Bibliography;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// A normalized citation record, modelled on Zotero's item JSON.
///
/// Built by the CSL import, corrected in place by a translator, then handed off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub item_type: ItemType,
    /// Identifier carried over from the import. Translators clear it before hand-off.
    pub item_id: Option<String>,
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub creators: Vec<Creator>,
    pub date: Option<String>,
    pub doi: Option<String>,
    pub abstract_note: Option<String>,
    pub publication_title: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub place: Option<String>,
    /// Base publisher slot; rendered under the type-specific name from
    /// [`ItemType::publisher_field`].
    pub publisher: Option<String>,
    pub archive: Option<String>,
    pub version_number: Option<String>,
    pub language: Option<String>,
    pub url: Option<String>,
    pub extra: Option<String>,
    pub library_catalog: Option<String>,
    pub tags: BTreeSet<String>,
    pub attachments: Vec<Attachment>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ItemType {
    #[default]
    JournalArticle,
    Artwork,
    Book,
    BookSection,
    ComputerProgram,
    ConferencePaper,
    Dataset,
    Document,
    Patent,
    Preprint,
    Presentation,
    Report,
    Thesis,
    VideoRecording,
    AudioRecording,
    WebPage,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::JournalArticle => "journalArticle",
            ItemType::Artwork => "artwork",
            ItemType::Book => "book",
            ItemType::BookSection => "bookSection",
            ItemType::ComputerProgram => "computerProgram",
            ItemType::ConferencePaper => "conferencePaper",
            ItemType::Dataset => "dataset",
            ItemType::Document => "document",
            ItemType::Patent => "patent",
            ItemType::Preprint => "preprint",
            ItemType::Presentation => "presentation",
            ItemType::Report => "report",
            ItemType::Thesis => "thesis",
            ItemType::VideoRecording => "videoRecording",
            ItemType::AudioRecording => "audioRecording",
            ItemType::WebPage => "webpage",
        }
    }

    /// Guess the item type from a CSL `type` value.
    pub fn from_csl(csl_type: &str) -> ItemType {
        match csl_type {
            "article-journal" | "article-magazine" | "article-newspaper" => {
                ItemType::JournalArticle
            }
            "article" => ItemType::Preprint,
            "book" => ItemType::Book,
            "chapter" => ItemType::BookSection,
            "dataset" => ItemType::Dataset,
            "graphic" => ItemType::Artwork,
            "motion_picture" | "broadcast" => ItemType::VideoRecording,
            "song" => ItemType::AudioRecording,
            "paper-conference" => ItemType::ConferencePaper,
            "patent" => ItemType::Patent,
            "report" => ItemType::Report,
            "software" => ItemType::ComputerProgram,
            "speech" => ItemType::Presentation,
            "thesis" => ItemType::Thesis,
            "webpage" | "post-weblog" => ItemType::WebPage,
            _ => ItemType::Document,
        }
    }

    /// Whether the schema gives this type a dedicated DOI field.
    pub fn has_doi_field(self) -> bool {
        matches!(
            self,
            ItemType::JournalArticle
                | ItemType::ConferencePaper
                | ItemType::Preprint
                | ItemType::Dataset
        )
    }

    /// The creator role that CSL `author` maps to for this type.
    pub fn primary_creator_type(self) -> &'static str {
        match self {
            ItemType::ComputerProgram => "programmer",
            ItemType::Presentation => "presenter",
            ItemType::Artwork => "artist",
            ItemType::Patent => "inventor",
            ItemType::VideoRecording => "director",
            ItemType::AudioRecording => "performer",
            _ => "author",
        }
    }

    /// Name under which the base publisher slot is stored for this type.
    pub fn publisher_field(self) -> Option<&'static str> {
        match self {
            ItemType::Thesis => Some("university"),
            ItemType::Report => Some("institution"),
            ItemType::ComputerProgram => Some("company"),
            ItemType::Dataset | ItemType::Preprint => Some("repository"),
            ItemType::AudioRecording => Some("label"),
            ItemType::VideoRecording => Some("distributor"),
            ItemType::Artwork | ItemType::Presentation | ItemType::JournalArticle => None,
            _ => Some("publisher"),
        }
    }

    fn biblatex_type(self) -> &'static str {
        match self {
            ItemType::JournalArticle => "article",
            ItemType::Artwork => "artwork",
            ItemType::Book => "book",
            ItemType::BookSection => "incollection",
            ItemType::ComputerProgram => "software",
            ItemType::ConferencePaper => "inproceedings",
            ItemType::Dataset => "dataset",
            ItemType::Patent => "patent",
            ItemType::Preprint | ItemType::WebPage => "online",
            ItemType::Presentation => "unpublished",
            ItemType::Report => "report",
            ItemType::Thesis => "thesis",
            ItemType::VideoRecording => "video",
            ItemType::AudioRecording => "audio",
            ItemType::Document => "misc",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub first_name: String,
    pub last_name: String,
    pub creator_type: String,
    /// Internal role id assigned by the import; never serialized.
    #[serde(skip)]
    pub creator_type_id: Option<u8>,
}

impl Creator {
    pub fn new(first_name: &str, last_name: &str, creator_type: &str) -> Self {
        Creator {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            creator_type: creator_type.to_string(),
            creator_type_id: None,
        }
    }

    fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.last_name.clone()
        } else {
            format!("{}, {}", self.last_name, self.first_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub title: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub note: String,
}

impl Item {
    pub fn new(item_type: ItemType) -> Self {
        Item {
            item_type,
            ..Default::default()
        }
    }

    /// Change the item type. Creator roles are left as imported; a DOI is dropped when the new
    /// type has no field for it.
    pub fn set_item_type(&mut self, item_type: ItemType) {
        if !item_type.has_doi_field() {
            self.doi = None;
        }
        self.item_type = item_type;
    }

    /// Append a line to the free-text `extra` field.
    pub fn push_extra(&mut self, line: &str) {
        match self.extra.as_mut() {
            Some(extra) if !extra.is_empty() => {
                extra.push('\n');
                extra.push_str(line);
            }
            _ => self.extra = Some(line.to_string()),
        }
    }

    /// Render as Zotero-style item JSON.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("itemType".into(), json!(self.item_type.as_str()));
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                obj.insert(key.to_string(), json!(v));
            }
        };
        put("title", &self.title);
        put("shortTitle", &self.short_title);
        put("date", &self.date);
        put("DOI", &self.doi);
        put("abstractNote", &self.abstract_note);
        put("publicationTitle", &self.publication_title);
        put("volume", &self.volume);
        put("issue", &self.issue);
        put("pages", &self.pages);
        put("ISBN", &self.isbn);
        put("ISSN", &self.issn);
        put("place", &self.place);
        if let Some(field) = self.item_type.publisher_field() {
            put(field, &self.publisher);
        }
        put("archive", &self.archive);
        put("versionNumber", &self.version_number);
        put("language", &self.language);
        put("url", &self.url);
        put("extra", &self.extra);
        put("libraryCatalog", &self.library_catalog);
        obj.insert("creators".into(), json!(self.creators));
        obj.insert(
            "tags".into(),
            Value::Array(self.tags.iter().map(|t| json!({ "tag": t })).collect()),
        );
        obj.insert("attachments".into(), json!(self.attachments));
        obj.insert("notes".into(), json!(self.notes));
        Value::Object(obj)
    }

    /// Render as a single BibLaTeX entry.
    pub fn to_biblatex(&self) -> anyhow::Result<String> {
        let mut fields: Vec<(&str, String)> = Vec::new();
        let mut put = |key: &'static str, value: Option<&str>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                fields.push((key, v.to_string()));
            }
        };
        put("title", self.title.as_deref());
        put("shorttitle", self.short_title.as_deref());
        let authors = self.creator_list(|t| t != "editor" && t != "translator");
        put("author", authors.as_deref());
        let editors = self.creator_list(|t| t == "editor");
        put("editor", editors.as_deref());
        let translators = self.creator_list(|t| t == "translator");
        put("translator", translators.as_deref());
        put("date", self.date.as_deref());
        put("doi", self.doi.as_deref());
        put("abstract", self.abstract_note.as_deref());
        put("journaltitle", self.publication_title.as_deref());
        put("volume", self.volume.as_deref());
        put("number", self.issue.as_deref());
        put("pages", self.pages.as_deref());
        put("isbn", self.isbn.as_deref());
        put("issn", self.issn.as_deref());
        put("location", self.place.as_deref());
        let publisher_key = match self.item_type {
            ItemType::Thesis | ItemType::Report => "institution",
            ItemType::Presentation => "organization",
            _ => "publisher",
        };
        put(publisher_key, self.publisher.as_deref());
        put("version", self.version_number.as_deref());
        put("langid", self.language.as_deref());
        put("url", self.url.as_deref());
        put("note", self.extra.as_deref());
        let keywords = self.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        put("keywords", Some(keywords.as_str()));
        if self.item_type == ItemType::Thesis {
            put("type", Some("thesis"));
        }

        let mut out = format!("@{}{{{},\n", self.item_type.biblatex_type(), self.cite_key());
        for (k, v) in fields {
            out.push_str(&format!("    {k} = {{{}}},\n", escape(&v)));
        }
        out.push_str("}\n");

        let bib = Bibliography::parse(&out)
            .map_err(|e| anyhow!("failed to parse constructed BibLaTeX: {e}"))?;
        let entry = bib
            .iter()
            .next()
            .ok_or_else(|| anyhow!("empty bibliography for {}", self.cite_key()))?;
        Ok(entry.to_biblatex_string())
    }

    fn creator_list(&self, role: impl Fn(&str) -> bool) -> Option<String> {
        let names: Vec<String> = self
            .creators
            .iter()
            .filter(|c| role(&c.creator_type))
            .map(Creator::display_name)
            .collect();
        (!names.is_empty()).then(|| names.join(" and "))
    }

    /// `<family><year>`, falling back to the last URL path segment.
    fn cite_key(&self) -> String {
        let family = self
            .creators
            .first()
            .map(|c| c.last_name.as_str())
            .unwrap_or_default();
        let family: String = family.chars().filter(|c| c.is_alphanumeric()).collect();
        let year = self
            .date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or_default();
        if !family.is_empty() {
            return format!("{}{}", family.to_lowercase(), year);
        }
        let slug = self
            .url
            .as_deref()
            .and_then(|u| u.trim_end_matches('/').rsplit('/').next())
            .unwrap_or("item");
        format!("{}{}", slug, year)
    }
}

/// Escape backslashes first so the brace escapes that follow stay intact.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
}
