//! Arbitrary page with a caller-supplied CSS selector.

use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::{ProductDescriptor, SourceType};
use rust_decimal::Decimal;

use super::{
    browser_request, positive_price, require_param, success_body, SourceAdapter, SourceContext,
};
use crate::error::AdapterError;
use crate::number::parse_loose;

/// Reads the element at `selector` on the page at `url`.
///
/// A selector that matches nothing is a normal "no price found" result: the
/// selector is expected to drift while the caller tunes it.
pub struct GenericSelectorAdapter {
    context: Arc<SourceContext>,
}

impl GenericSelectorAdapter {
    #[must_use]
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceAdapter for GenericSelectorAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::GenericSelector
    }

    async fn extract(
        &self,
        descriptor: &ProductDescriptor,
    ) -> Result<Option<Decimal>, AdapterError> {
        let url = require_param(descriptor, "url")?;
        let selector = require_param(descriptor, "selector")?;

        let request = browser_request(url, &self.context.settings);
        let result = self.context.transport.fetch(&request).await;
        let body = success_body(result, &request)?;

        let Some(text) = self.context.pages.select_text(&body, selector) else {
            tracing::debug!(product = %descriptor.name, selector, "selector matched nothing");
            return Ok(None);
        };

        Ok(parse_loose(&text)?.and_then(positive_price))
    }
}
