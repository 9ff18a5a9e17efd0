use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector, html::Select};
use url::Url;

static META_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[name][content]").unwrap());

/// A parsed web page together with the URL it was loaded from.
pub struct Document {
    html: Html,
    url: Url,
}

impl Document {
    pub fn parse(html: &str, url: Url) -> Self {
        Document {
            html: Html::parse_document(html),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Elements matching `selector`, in document order.
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Trimmed `content` of the first `<meta name=…>` with a non-empty value.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.meta_contents(name).into_iter().next()
    }

    /// Trimmed `content` of every `<meta name=…>`, skipping empty values.
    pub fn meta_contents(&self, name: &str) -> Vec<String> {
        self.html
            .select(&META_TAG)
            .filter(|m| m.value().attr("name") == Some(name))
            .filter_map(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Absolute URL of an element's `href`, resolved against the page URL.
    pub fn href(&self, element: &ElementRef<'_>) -> Option<Url> {
        let href = element.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        self.url.join(href).ok()
    }
}

/// Concatenated text content of an element.
pub fn text_content(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
