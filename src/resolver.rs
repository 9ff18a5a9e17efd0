use anyhow::anyhow;
use tracing::info;
use url::Url;

use crate::{
    config::Config,
    fetch::Fetch,
    select::ItemSelector,
    translator::{Harvest, PageKind, Translator, zenodo::Zenodo},
};

/// Translators to try, in order.
///
/// NOTE: Ordering is important here, as it signifies priority. If two translators target the same
/// URL, the first one in this list is used.
pub fn translators(config: &Config) -> Vec<Box<dyn Translator>> {
    vec![Box::new(Zenodo::new(config.clone()))]
}

/// Find the translator whose target matches `url`.
pub fn find<'a>(translators: &'a [Box<dyn Translator>], url: &Url) -> Option<&'a dyn Translator> {
    translators
        .iter()
        .find(|t| t.target().is_match(url.as_str()))
        .map(|t| t.as_ref())
}

/// Fetch the page at `url` and report what the matching translator sees there.
pub fn detect(url: &Url, config: &Config, fetcher: &dyn Fetch) -> anyhow::Result<Option<PageKind>> {
    let translators = translators(config);
    let translator = find(&translators, url).ok_or_else(|| anyhow!("unsupported URL: {url}"))?;
    let doc = fetcher.document(url)?;
    Ok(translator.detect_web(&doc))
}

/// Fetch the page at `url` and import everything the matching translator finds.
pub fn resolve(
    url: &Url,
    config: &Config,
    fetcher: &dyn Fetch,
    selector: &mut dyn ItemSelector,
) -> anyhow::Result<Harvest> {
    let translators = translators(config);
    let translator = find(&translators, url).ok_or_else(|| anyhow!("unsupported URL: {url}"))?;
    let doc = fetcher.document(url)?;
    let harvest = translator.do_web(&doc, fetcher, selector)?;
    info!(
        %url,
        items = harvest.items.len(),
        failures = harvest.failures.len(),
        "resolved"
    );
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_matches_zenodo_urls_only() {
        let config = Config::default();
        let translators = translators(&config);
        proptest::proptest!(|(id in 1u64..100_000_000, scheme in proptest::sample::select(vec!["http", "https"]))| {
            let url = Url::parse(&format!("{scheme}://zenodo.org/records/{id}")).unwrap();
            proptest::prop_assert!(find(&translators, &url).is_some());
        });
        for other in ["https://example.org/records/1", "https://sandbox.zenodo.org/records/1"] {
            let url = Url::parse(other).unwrap();
            assert!(find(&translators, &url).is_none(), "{other}");
        }
    }

    #[test]
    fn resolve_errors_for_unsupported_url() {
        struct NoNetwork;
        impl Fetch for NoNetwork {
            fn text(&self, url: &Url) -> anyhow::Result<String> {
                Err(anyhow!("unexpected fetch of {url}"))
            }
        }
        let url = Url::parse("https://example.org/").unwrap();
        let err = resolve(&url, &Config::default(), &NoNetwork, &mut crate::select::SelectAll)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported URL"));
    }
}
