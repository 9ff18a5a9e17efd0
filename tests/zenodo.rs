use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::anyhow;
use url::Url;
use zenodo_bib::{
    config::{Config, DatasetSupport},
    fetch::Fetch,
    item::{Creator, ItemType, Note},
    resolver,
    select::{ItemSelector, SelectAll},
    translator::{PageKind, Translator, zenodo::Zenodo},
};

/// Serves fixture files in place of the network.
struct Fixtures(HashMap<String, PathBuf>);

impl Fixtures {
    fn new(routes: &[(&str, &str)]) -> Self {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        Fixtures(
            routes
                .iter()
                .map(|(url, file)| (url.to_string(), dir.join(file)))
                .collect(),
        )
    }

    fn record(id: &str) -> Vec<(String, String)> {
        vec![
            (
                format!("https://zenodo.org/records/{id}"),
                format!("record_{id}.html"),
            ),
            (
                format!("https://zenodo.org/records/{id}/export/csl"),
                format!("record_{id}.csl.json"),
            ),
        ]
    }

    fn records(ids: &[&str]) -> Self {
        let routes: Vec<(String, String)> = ids.iter().flat_map(|id| Self::record(id)).collect();
        let borrowed: Vec<(&str, &str)> = routes
            .iter()
            .map(|(u, f)| (u.as_str(), f.as_str()))
            .collect();
        Self::new(&borrowed)
    }
}

impl Fetch for Fixtures {
    fn text(&self, url: &Url) -> anyhow::Result<String> {
        // Requests carry the page URL minus its fragment.
        let mut key = url.clone();
        key.set_fragment(None);
        let path = self
            .0
            .get(key.as_str())
            .ok_or_else(|| anyhow!("404 Not Found: {url}"))?;
        Ok(fs::read_to_string(path)?)
    }
}

/// Refuses every listing.
struct Decline;

impl ItemSelector for Decline {
    fn select(
        &mut self,
        _: &std::collections::BTreeMap<String, String>,
    ) -> anyhow::Result<Option<Vec<String>>> {
        Ok(None)
    }
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn thesis_record_with_pdf() {
    let fetcher = Fixtures::records(&["54766"]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/54766#.ZEAfIMQpAUE"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");

    assert!(harvest.failures.is_empty());
    assert_eq!(harvest.items.len(), 1);
    let item = &harvest.items[0];
    assert_eq!(item.item_type, ItemType::Thesis);
    assert_eq!(item.url.as_deref(), Some("https://zenodo.org/records/54766"));
    assert_eq!(item.date.as_deref(), Some("2016-06-03"));
    assert_eq!(item.extra.as_deref(), Some("DOI: 10.5281/zenodo.54766"));
    assert_eq!(item.doi, None);
    assert_eq!(item.publisher, None);
    assert_eq!(item.archive.as_deref(), Some("Zenodo"));
    assert_eq!(item.library_catalog.as_deref(), Some("Zenodo"));
    assert_eq!(item.item_id, None);
    assert_eq!(item.creators, vec![Creator::new("Stefan", "Asenov", "author")]);
    assert!(item.tags.contains("strain steering system"));
    assert!(
        item.abstract_note
            .as_deref()
            .unwrap()
            .starts_with("Modern day manufacturers")
    );

    assert_eq!(item.attachments.len(), 1);
    assert_eq!(item.attachments[0].title, "Zenodo Full Text PDF");
    assert_eq!(item.attachments[0].mime_type, "application/pdf");
    assert_eq!(
        item.attachments[0].url,
        "https://zenodo.org/records/54766/files/Dissertation.pdf"
    );

    let json = item.to_json();
    assert_eq!(json["itemType"], "thesis");
    assert!(json.get("university").is_none());
}

#[test]
fn presentation_without_pdf_gets_snapshot_and_note() {
    let fetcher = Fixtures::records(&["54747"]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/54747"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");

    let item = &harvest.items[0];
    assert_eq!(item.item_type, ItemType::Presentation);
    assert_eq!(item.creators, vec![Creator::new("Marieke", "Guy", "presenter")]);
    assert_eq!(item.date.as_deref(), Some("2015-09-17"));
    assert_eq!(item.place.as_deref(), Some("Brussels"));
    assert_eq!(item.extra.as_deref(), Some("DOI: 10.5281/zenodo.54747"));
    assert_eq!(
        item.notes,
        vec![Note {
            note: "Funding by European Commission ROR 00k4n6c32.".into()
        }]
    );
    assert_eq!(item.tags.len(), 5);

    assert_eq!(item.attachments.len(), 1);
    assert_eq!(item.attachments[0].title, "Zenodo Snapshot");
    assert_eq!(item.attachments[0].mime_type, "text/html");
    assert_eq!(item.attachments[0].url, "https://zenodo.org/records/54747");
}

#[test]
fn preprint_keeps_doi_and_splits_combined_names() {
    let fetcher = Fixtures::records(&["8092340"]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/8092340"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");

    let item = &harvest.items[0];
    assert_eq!(item.item_type, ItemType::Preprint);
    assert_eq!(item.doi.as_deref(), Some("10.5281/zenodo.8092340"));
    assert_eq!(item.extra, None);
    assert_eq!(
        item.creators,
        vec![
            Creator::new("David E.", "Schindel", "author"),
            Creator::new("Roderic D. M. Page", "Page", "author"),
        ]
    );
    assert_eq!(
        item.short_title.as_deref(),
        Some("Creating Virtuous Cycles for DNA Barcoding")
    );
    assert_eq!(item.to_json()["repository"], "Zenodo");
}

#[test]
fn figure_record_is_artwork_with_authors() {
    let fetcher = Fixtures::records(&["14837"]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/14837"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");

    let item = &harvest.items[0];
    assert_eq!(item.item_type, ItemType::Artwork);
    assert_eq!(
        item.creators,
        vec![
            Creator::new("Jan", "Bosselaers", "author"),
            Creator::new("Hans", "Henderickx", "author"),
        ]
    );
    assert_eq!(item.date.as_deref(), Some("2002-11-26"));
    assert_eq!(item.extra.as_deref(), Some("DOI: 10.5281/zenodo.14837"));
    assert_eq!(
        item.short_title.as_deref(),
        Some("Figures 8-11 in A new Savignia from Cretan caves (Araneae")
    );
    assert_eq!(item.tags.len(), 9);
    assert_eq!(item.attachments[0].title, "Zenodo Snapshot");

    let json = item.to_json();
    assert_eq!(json["itemType"], "artwork");
    assert_eq!(json["creators"][1]["creatorType"], "author");
}

#[test]
fn dataset_native_and_fallback() {
    let fetcher = Fixtures::records(&["45756"]);
    let page = url("https://zenodo.org/records/45756");

    let native = resolver::resolve(&page, &Config::default(), &fetcher, &mut SelectAll)
        .expect("resolve");
    let item = &native.items[0];
    assert_eq!(item.item_type, ItemType::Dataset);
    assert_eq!(item.doi.as_deref(), Some("10.5281/zenodo.45756"));
    assert_eq!(item.extra, None);
    assert_eq!(
        item.publication_title.as_deref(),
        Some("Structural Genomics Consortium")
    );
    assert_eq!(item.creators[1], Creator::new("Yanli", "Liu", "author"));

    let config = Config {
        dataset_support: DatasetSupport::Fallback,
        ..Config::default()
    };
    let fallback = resolver::resolve(&page, &config, &fetcher, &mut SelectAll).expect("resolve");
    let item = &fallback.items[0];
    assert_eq!(item.item_type, ItemType::Document);
    assert_eq!(item.doi, None);
    assert_eq!(
        item.extra.as_deref(),
        Some("DOI: 10.5281/zenodo.45756\nType: dataset")
    );
}

#[test]
fn search_listing_imports_selected_records_and_isolates_failures() {
    let mut routes: Vec<(String, String)> = ["54766", "54747"]
        .iter()
        .flat_map(|id| Fixtures::record(id))
        .collect();
    routes.push((
        "https://zenodo.org/search?q=steering".into(),
        "search.html".into(),
    ));
    // Page exists but its export does not.
    routes.push((
        "https://zenodo.org/records/404".into(),
        "record_54766.html".into(),
    ));
    let borrowed: Vec<(&str, &str)> = routes
        .iter()
        .map(|(u, f)| (u.as_str(), f.as_str()))
        .collect();
    let fetcher = Fixtures::new(&borrowed);

    let listing = url("https://zenodo.org/search?q=steering");
    assert_eq!(
        resolver::detect(&listing, &Config::default(), &fetcher).expect("detect"),
        Some(PageKind::Multiple)
    );

    let harvest = resolver::resolve(&listing, &Config::default(), &fetcher, &mut SelectAll)
        .expect("resolve");
    let mut types: Vec<ItemType> = harvest.items.iter().map(|i| i.item_type).collect();
    types.sort_by_key(|t| t.as_str());
    assert_eq!(types, vec![ItemType::Presentation, ItemType::Thesis]);

    assert_eq!(harvest.failures.len(), 1);
    let (failed, err) = &harvest.failures[0];
    assert_eq!(failed, "https://zenodo.org/records/404");
    assert!(format!("{err:#}").contains("failed to fetch CSL export"));
}

#[test]
fn declined_selection_imports_nothing() {
    let fetcher = Fixtures::new(&[("https://zenodo.org/search?q=steering", "search.html")]);
    let translator = Zenodo::new(Config::default());
    let doc = fetcher
        .document(&url("https://zenodo.org/search?q=steering"))
        .expect("document");
    let harvest = translator
        .do_web(&doc, &fetcher, &mut Decline)
        .expect("do_web");
    assert!(harvest.items.is_empty());
    assert!(harvest.failures.is_empty());
}

#[test]
fn missing_export_is_an_item_failure() {
    let fetcher = Fixtures::new(&[("https://zenodo.org/records/54766", "record_54766.html")]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/54766"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");
    assert!(harvest.items.is_empty());
    assert_eq!(harvest.failures.len(), 1);
    assert_eq!(harvest.failures[0].0, "https://zenodo.org/records/54766");
}

#[test]
fn detect_reports_record_type() {
    let fetcher = Fixtures::records(&["8092340"]);
    let kind = resolver::detect(
        &url("https://zenodo.org/records/8092340"),
        &Config::default(),
        &fetcher,
    )
    .expect("detect");
    assert_eq!(kind, Some(PageKind::Record(ItemType::Preprint)));
}

#[test]
fn biblatex_output_parses() {
    let fetcher = Fixtures::records(&["54766"]);
    let harvest = resolver::resolve(
        &url("https://zenodo.org/records/54766"),
        &Config::default(),
        &fetcher,
        &mut SelectAll,
    )
    .expect("resolve");
    let bib = harvest.items[0].to_biblatex().expect("biblatex");
    assert!(bib.starts_with("@thesis{asenov2016,"), "{bib}");
}
