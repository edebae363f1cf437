//! Price-history API adapter (Keepa).

use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::{ProductDescriptor, SourceType, TIMESERIES_API_KEY};
use reqwest::Url;
use rust_decimal::Decimal;

use super::{from_minor_units, require_param, success_body, SourceAdapter, SourceContext};
use crate::error::{AdapterError, ErrorReason};
use crate::fallback::{first_success, Strategy, StrategyResult};
use crate::transport::FetchRequest;
use crate::types::{KeepaProduct, KeepaResponse};

/// Fallback chain, cheapest reliable signal first.
const STRATEGIES: &[Strategy<KeepaProduct>] = &[
    Strategy {
        name: "buy_box_price",
        run: buy_box_price,
    },
    Strategy {
        name: "latest_new_offer",
        run: latest_new_offer,
    },
    Strategy {
        name: "list_price",
        run: list_price,
    },
];

fn positive_minor_units(cents: Option<i64>) -> StrategyResult {
    Ok(cents.filter(|c| *c > 0).map(from_minor_units))
}

fn buy_box_price(product: &KeepaProduct) -> StrategyResult {
    positive_minor_units(product.buy_box_price)
}

fn latest_new_offer(product: &KeepaProduct) -> StrategyResult {
    positive_minor_units(product.latest_new_price())
}

fn list_price(product: &KeepaProduct) -> StrategyResult {
    positive_minor_units(product.list_price)
}

/// Looks up a product by `asin` on the price-history API.
///
/// Requires the `TIMESERIES_API_KEY` credential. An optional `domain` param
/// overrides the configured marketplace locale.
pub struct TimeSeriesAdapter {
    context: Arc<SourceContext>,
    base_url: String,
    default_domain: String,
}

impl TimeSeriesAdapter {
    #[must_use]
    pub fn new(context: Arc<SourceContext>, base_url: &str, default_domain: &str) -> Self {
        Self {
            context,
            base_url: base_url.trim_end_matches('/').to_owned(),
            default_domain: default_domain.to_owned(),
        }
    }

    fn product_url(&self, key: &str, domain: &str, asin: &str) -> Result<String, AdapterError> {
        let mut url = Url::parse(&format!("{}/product", self.base_url)).map_err(|e| {
            AdapterError::new(
                ErrorReason::TransportFailure,
                format!("invalid price-history base URL \"{}\": {e}", self.base_url),
            )
        })?;

        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("domain", domain)
            .append_pair("asin", asin)
            .append_pair("buybox", "1");

        Ok(url.to_string())
    }
}

#[async_trait]
impl SourceAdapter for TimeSeriesAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::TimeSeries
    }

    async fn extract(
        &self,
        descriptor: &ProductDescriptor,
    ) -> Result<Option<Decimal>, AdapterError> {
        let key = self
            .context
            .credentials
            .get(TIMESERIES_API_KEY)
            .ok_or_else(|| AdapterError::missing_credential(TIMESERIES_API_KEY))?;
        let asin = require_param(descriptor, "asin")?;
        let domain = descriptor
            .param("domain")
            .unwrap_or(self.default_domain.as_str());

        let request = FetchRequest::get(
            self.product_url(key, domain, asin)?,
            self.context.settings.timeout,
        )
        .with_header("Accept", "application/json");
        let result = self.context.transport.fetch(&request).await;
        let body = success_body(result, &request)?;

        let response: KeepaResponse = serde_json::from_str(&body)
            .map_err(|e| AdapterError::shape(format!("invalid price-history JSON: {e}")))?;
        let product = response
            .products
            .first()
            .ok_or_else(|| AdapterError::shape(format!("no product returned for asin {asin}")))?;

        match first_success(product, STRATEGIES)? {
            Some((_, price)) => Ok(Some(price)),
            None => Err(AdapterError::shape(format!(
                "no buy-box, new-offer or list price for asin {asin}"
            ))),
        }
    }
}
