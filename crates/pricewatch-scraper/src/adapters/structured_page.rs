//! Marketplace product page adapter (Cdiscount page family).

use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::{ProductDescriptor, SourceType};
use rust_decimal::Decimal;

use super::{
    browser_request, positive_price, require_param, success_body, SourceAdapter, SourceContext,
};
use crate::error::{AdapterError, ErrorReason};
use crate::fallback::{first_success, Strategy, StrategyResult};
use crate::number::{find_currency_amount, parse_price};
use crate::page::PageQuery;

/// Selectors known to hold the displayed price on this page family, most
/// specific first.
pub const DEFAULT_PRICE_SELECTORS: &[&str] = &[
    ".prdtBlocPrice .price",
    ".price:last-child",
    "[itemprop=\"price\"]",
];

struct PageDocument<'a> {
    body: &'a str,
    pages: &'a dyn PageQuery,
    selectors: &'a [&'a str],
}

fn strategies<'a>() -> [Strategy<PageDocument<'a>>; 2] {
    [
        Strategy {
            name: "price_selector",
            run: by_selector,
        },
        Strategy {
            name: "currency_scan",
            run: by_currency_scan,
        },
    ]
}

/// A matched element must parse; its failure is not masked by the scan.
fn by_selector(doc: &PageDocument<'_>) -> StrategyResult {
    let Some((idx, text)) = doc.pages.select_first(doc.body, doc.selectors) else {
        return Ok(None);
    };
    tracing::debug!(selector = doc.selectors[idx], text = %text, "price element matched");
    Ok(positive_price(parse_price(&text)?))
}

fn by_currency_scan(doc: &PageDocument<'_>) -> StrategyResult {
    match find_currency_amount(doc.body) {
        Some(candidate) => Ok(positive_price(parse_price(candidate)?)),
        None => Ok(None),
    }
}

/// Scrapes a product page by `url`.
///
/// A `selector` param replaces the default selector list for that product.
pub struct StructuredPageAdapter {
    context: Arc<SourceContext>,
    selectors: Vec<String>,
}

impl StructuredPageAdapter {
    #[must_use]
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self::with_selectors(
            context,
            DEFAULT_PRICE_SELECTORS.iter().map(|s| (*s).to_owned()).collect(),
        )
    }

    #[must_use]
    pub fn with_selectors(context: Arc<SourceContext>, selectors: Vec<String>) -> Self {
        Self { context, selectors }
    }
}

#[async_trait]
impl SourceAdapter for StructuredPageAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::StructuredPage
    }

    async fn extract(
        &self,
        descriptor: &ProductDescriptor,
    ) -> Result<Option<Decimal>, AdapterError> {
        let url = require_param(descriptor, "url")?;

        let request = browser_request(url, &self.context.settings);
        let result = self.context.transport.fetch(&request).await;
        let body = success_body(result, &request)?;

        let selectors: Vec<&str> = match descriptor.param("selector") {
            Some(custom) => vec![custom],
            None => self.selectors.iter().map(String::as_str).collect(),
        };
        let document = PageDocument {
            body: &body,
            pages: self.context.pages.as_ref(),
            selectors: &selectors,
        };

        match first_success(&document, &strategies())? {
            Some((_, price)) => Ok(Some(price)),
            None => Err(AdapterError::new(
                ErrorReason::SelectorNotFound,
                format!("no price element or currency amount on {url}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::adapters::test_support::{context, FakeTransport};
    use crate::credentials::Credentials;
    use crate::transport::RawFetchResult;

    const URL: &str = "https://www.cdiscount.test/f-14404-goo1715718410917.html";

    fn adapter(transport: &Arc<FakeTransport>) -> StructuredPageAdapter {
        StructuredPageAdapter::new(context(transport, Credentials::new()))
    }

    fn descriptor() -> ProductDescriptor {
        ProductDescriptor::new("Pixel 8a", "structured_page").with_param("url", URL)
    }

    fn page(html: &str) -> RawFetchResult {
        RawFetchResult::success(html, Some("text/html; charset=utf-8"))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn primary_selector_match_is_parsed() {
        let transport = FakeTransport::with_responses(vec![page(
            r#"<div class="prdtBlocPrice"><span class="price">1.299<sup>,00 €</sup></span></div>"#,
        )]);
        let price = adapter(&transport).extract(&descriptor()).await.unwrap();
        assert_eq!(price, Some(dec("1299")));
    }

    #[tokio::test]
    async fn falls_back_to_currency_scan_when_no_selector_matches() {
        let transport = FakeTransport::with_responses(vec![page(
            r#"<html><body><div class="fpPrice">329,00€</div></body></html>"#,
        )]);
        let price = adapter(&transport).extract(&descriptor()).await.unwrap();
        assert_eq!(price, Some(dec("329.00")));
    }

    #[tokio::test]
    async fn plain_space_grouped_amount_in_currency_scan() {
        let transport =
            FakeTransport::with_responses(vec![page("<html><body><p>1 299,00 €</p></body></html>")]);
        let price = adapter(&transport).extract(&descriptor()).await.unwrap();
        assert_eq!(price, Some(dec("1299.00")));
    }

    #[tokio::test]
    async fn zero_price_is_selector_not_found() {
        let transport =
            FakeTransport::with_responses(vec![page(r#"<span class="price">0,00 €</span>"#)]);
        let err = adapter(&transport).extract(&descriptor()).await.unwrap_err();
        assert_eq!(err.reason, ErrorReason::SelectorNotFound);
    }

    #[tokio::test]
    async fn zero_selector_match_falls_back_to_currency_scan() {
        let transport = FakeTransport::with_responses(vec![page(
            r#"<div class="prdtBlocPrice"><span class="price">0,00</span></div><p>à partir de 349,00 €</p>"#,
        )]);
        let price = adapter(&transport).extract(&descriptor()).await.unwrap();
        assert_eq!(price, Some(dec("349.00")));
    }

    #[tokio::test]
    async fn nothing_found_is_selector_not_found() {
        let transport =
            FakeTransport::with_responses(vec![page("<html><body>Produit indisponible</body></html>")]);
        let err = adapter(&transport).extract(&descriptor()).await.unwrap_err();
        assert_eq!(err.reason, ErrorReason::SelectorNotFound);
    }

    #[tokio::test]
    async fn unparsable_match_propagates_without_scanning() {
        let transport = FakeTransport::with_responses(vec![page(
            r#"<div class="prdtBlocPrice"><span class="price">Épuisé</span></div><p>349,00 €</p>"#,
        )]);
        let err = adapter(&transport).extract(&descriptor()).await.unwrap_err();
        assert_eq!(err.reason, ErrorReason::NumberParseFailure);
    }

    #[tokio::test]
    async fn selector_param_overrides_defaults() {
        let transport = FakeTransport::with_responses(vec![page(
            r#"<span class="price">10,00 €</span><b id="real">12,50 €</b>"#,
        )]);
        let product = descriptor().with_param("selector", "#real");
        let price = adapter(&transport).extract(&product).await.unwrap();
        assert_eq!(price, Some(dec("12.50")));
    }

    #[tokio::test]
    async fn sends_browser_headers_without_credentials() {
        let transport = FakeTransport::with_responses(vec![page("<p>5,00 €</p>")]);
        adapter(&transport).extract(&descriptor()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, URL);
        assert_eq!(requests[0].header("user-agent"), Some("pricewatch-test/0.1"));
        assert!(requests[0].header("accept-language").is_some());
        assert!(requests[0].header("authorization").is_none());
    }

    #[tokio::test]
    async fn blocked_page_is_transport_failure() {
        let transport = FakeTransport::with_responses(vec![RawFetchResult::http_error(403, "denied")]);
        let err = adapter(&transport).extract(&descriptor()).await.unwrap_err();
        assert_eq!(err.reason, ErrorReason::TransportFailure);
    }

    #[tokio::test]
    async fn missing_url_is_invalid_descriptor() {
        let transport = FakeTransport::with_responses(vec![]);
        let err = adapter(&transport)
            .extract(&ProductDescriptor::new("Pixel 8a", "structured_page"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, ErrorReason::InvalidDescriptor);
        assert_eq!(transport.call_count(), 0);
    }
}
