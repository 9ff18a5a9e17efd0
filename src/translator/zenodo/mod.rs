//! Translator for records and search listings on zenodo.org.
//!
//! A record page is imported from its CSL-JSON export and then corrected with what the page
//! itself says (resource-type badge, DOI, PDF link, keywords, abstract). A search page offers its
//! results for selection and each chosen record is scraped on its own.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::Config,
    document::Document,
    fetch::{Fetch, process_documents},
    select::ItemSelector,
    translator::{Harvest, PageKind, Translator},
};

pub mod classify;
pub mod listing;
pub mod scrape;

static TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://zenodo\.org").unwrap());

pub struct Zenodo {
    config: Config,
}

impl Zenodo {
    pub fn new(config: Config) -> Self {
        Zenodo { config }
    }
}

impl Translator for Zenodo {
    fn target(&self) -> &Regex {
        &TARGET
    }

    fn detect_web(&self, doc: &Document) -> Option<PageKind> {
        let kind = classify::detect(doc, &self.config);
        debug!(url = %doc.url(), kind = ?kind, "detected page");
        kind
    }

    fn do_web(
        &self,
        doc: &Document,
        fetcher: &dyn Fetch,
        selector: &mut dyn ItemSelector,
    ) -> anyhow::Result<Harvest> {
        match self.detect_web(doc) {
            Some(PageKind::Multiple) => {
                let results = listing::search_results(doc);
                info!(count = results.len(), "search results found");
                let Some(chosen) = selector.select(&results)? else {
                    return Ok(Harvest::default());
                };
                let urls: Vec<Url> = chosen
                    .iter()
                    .filter_map(|link| match Url::parse(link) {
                        Ok(url) => Some(url),
                        Err(err) => {
                            warn!(%link, %err, "skipping unparsable link");
                            None
                        }
                    })
                    .collect();
                Ok(process_documents(fetcher, &urls, |record| {
                    scrape::scrape(record, fetcher, &self.config)
                }))
            }
            Some(PageKind::Record(_)) => {
                let mut harvest = Harvest::default();
                match scrape::scrape(doc, fetcher, &self.config) {
                    Ok(items) => harvest.items = items,
                    Err(err) => harvest.failures.push((doc.url().to_string(), err)),
                }
                Ok(harvest)
            }
            None => anyhow::bail!("no {} record or listing at {}", self.config.site_name, doc.url()),
        }
    }
}
