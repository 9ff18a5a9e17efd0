use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use url::Url;

use crate::{config::Config, document::Document, item::Item, translator::Harvest};

/// Retrieves the body of a URL as text.
pub trait Fetch {
    fn text(&self, url: &Url) -> anyhow::Result<String>;

    /// Fetch a URL and parse it as an HTML document.
    fn document(&self, url: &Url) -> anyhow::Result<Document> {
        let body = self.text(url)?;
        Ok(Document::parse(&body, url.clone()))
    }
}

/// Blocking HTTP(S) fetcher. Non-2xx responses are errors; there are no retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build();
        HttpFetcher {
            agent: ureq::Agent::new_with_config(cfg),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Fetch for HttpFetcher {
    fn text(&self, url: &Url) -> anyhow::Result<String> {
        debug!(%url, "fetching");
        let res = self
            .agent
            .get(url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .with_context(|| format!("failed request for URL {url}"))?;
        res.into_body()
            .read_to_string()
            .with_context(|| format!("failed to read body of {url}"))
    }
}

/// Fetch each URL as a document and hand it to `handler`.
///
/// Every URL is attempted once. A failure is recorded against its URL and does not stop the rest.
pub fn process_documents<F>(fetcher: &dyn Fetch, urls: &[Url], mut handler: F) -> Harvest
where
    F: FnMut(&Document) -> anyhow::Result<Vec<Item>>,
{
    let pb = ProgressBar::new(urls.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut harvest = Harvest::default();
    for url in urls {
        pb.set_message(url.to_string());
        match fetcher.document(url).and_then(|doc| handler(&doc)) {
            Ok(items) => harvest.items.extend(items),
            Err(err) => {
                warn!(%url, error = %format!("{err:#}"), "item failed");
                harvest.failures.push((url.to_string(), err));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    harvest
}
