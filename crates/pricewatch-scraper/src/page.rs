//! CSS selector queries over fetched HTML.

use scraper::{Html, Selector};

/// Page-query capability: text content of the first element matching a
/// selector.
pub trait PageQuery: Send + Sync {
    fn select_text(&self, document: &str, selector: &str) -> Option<String>;

    /// Tries `selectors` in order and returns the index and text of the first
    /// one that matches.
    fn select_first(&self, document: &str, selectors: &[&str]) -> Option<(usize, String)> {
        selectors
            .iter()
            .enumerate()
            .find_map(|(idx, sel)| self.select_text(document, sel).map(|text| (idx, text)))
    }
}

/// [`PageQuery`] backed by the `scraper` HTML parser.
///
/// Invalid selectors never match; they are logged so a bad catalog entry is
/// visible.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlPageQuery;

impl HtmlPageQuery {
    fn parse_selector(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(selector, error = %e, "invalid CSS selector");
                None
            }
        }
    }

    fn first_text(html: &Html, selector: &Selector) -> Option<String> {
        html.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
    }
}

impl PageQuery for HtmlPageQuery {
    fn select_text(&self, document: &str, selector: &str) -> Option<String> {
        let selector = Self::parse_selector(selector)?;
        let html = Html::parse_document(document);
        Self::first_text(&html, &selector)
    }

    // Parse the document once for the whole list.
    fn select_first(&self, document: &str, selectors: &[&str]) -> Option<(usize, String)> {
        let html = Html::parse_document(document);
        selectors.iter().enumerate().find_map(|(idx, sel)| {
            let selector = Self::parse_selector(sel)?;
            Self::first_text(&html, &selector).map(|text| (idx, text))
        })
    }
}
