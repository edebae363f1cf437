//! Marketplace offer API adapter (Back Market).

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::{ProductDescriptor, SourceType, MARKETPLACE_API_TOKEN};
use reqwest::Url;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{positive_price, require_param, success_body, SourceAdapter, SourceContext};
use crate::error::{AdapterError, ErrorReason};
use crate::fallback::{first_success, Strategy, StrategyResult};
use crate::number::parse_price;
use crate::transport::FetchRequest;
use crate::types::{OfferPrice, OfferResponse};

const STRATEGIES: &[Strategy<OfferPrice>] = &[
    Strategy {
        name: "raw",
        run: raw_price,
    },
    Strategy {
        name: "value",
        run: numeric_value,
    },
];

fn raw_price(price: &OfferPrice) -> StrategyResult {
    Ok(price.raw.as_ref().and_then(decimal_from_value))
}

fn numeric_value(price: &OfferPrice) -> StrategyResult {
    Ok(price.value.as_ref().and_then(decimal_from_value))
}

/// A field only counts when it yields a positive number; an unparsable or
/// zero field passes to the next strategy.
fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_price(s).ok().and_then(positive_price),
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
                .and_then(positive_price)
        }
        _ => None,
    }
}

/// Looks up the current offer for a `sku` (product id or slug).
///
/// Requires the `MARKETPLACE_API_TOKEN` bearer credential.
pub struct MarketplaceAdapter {
    context: Arc<SourceContext>,
    base_url: String,
}

impl MarketplaceAdapter {
    #[must_use]
    pub fn new(context: Arc<SourceContext>, base_url: &str) -> Self {
        Self {
            context,
            base_url: base_url.to_owned(),
        }
    }

    fn offer_url(&self, sku: &str) -> Result<String, AdapterError> {
        let invalid_base = |reason: String| {
            AdapterError::new(
                ErrorReason::TransportFailure,
                format!("invalid marketplace base URL \"{}\": {reason}", self.base_url),
            )
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid_base(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid_base("cannot be a base".to_owned()))?
            .pop_if_empty()
            .push("offers")
            .push(sku);

        Ok(url.to_string())
    }
}

#[async_trait]
impl SourceAdapter for MarketplaceAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Marketplace
    }

    async fn extract(
        &self,
        descriptor: &ProductDescriptor,
    ) -> Result<Option<Decimal>, AdapterError> {
        let token = self
            .context
            .credentials
            .get(MARKETPLACE_API_TOKEN)
            .ok_or_else(|| AdapterError::missing_credential(MARKETPLACE_API_TOKEN))?;
        let sku = require_param(descriptor, "sku")?;

        let request = FetchRequest::get(self.offer_url(sku)?, self.context.settings.timeout)
            .with_header("Authorization", &format!("Bearer {token}"))
            .with_header("Accept", "application/json");
        let result = self.context.transport.fetch(&request).await;
        let body = success_body(result, &request)?;

        let response: OfferResponse = serde_json::from_str(&body)
            .map_err(|e| AdapterError::shape(format!("invalid offer JSON: {e}")))?;
        let price = response
            .price
            .ok_or_else(|| AdapterError::shape(format!("offer {sku} has no price object")))?;

        match first_success(&price, STRATEGIES)? {
            Some((_, amount)) => Ok(Some(amount)),
            None => Err(AdapterError::shape(format!(
                "offer {sku} price has neither a usable raw nor value field"
            ))),
        }
    }
}
