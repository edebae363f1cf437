//! Source adapters: one per [`SourceType`].
//!
//! Every adapter receives its collaborators through a shared
//! [`SourceContext`] at construction and exposes the same
//! [`SourceAdapter::extract`] contract. Within an adapter, extraction steps
//! run as an ordered [`crate::fallback`] chain.

mod generic_selector;
mod marketplace;
mod structured_page;
mod time_series;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pricewatch_core::{AppConfig, ProductDescriptor, SourceType};
use rust_decimal::Decimal;

pub use generic_selector::GenericSelectorAdapter;
pub use marketplace::MarketplaceAdapter;
pub use structured_page::{StructuredPageAdapter, DEFAULT_PRICE_SELECTORS};
pub use time_series::TimeSeriesAdapter;

use crate::credentials::Credentials;
use crate::error::{AdapterError, ErrorReason};
use crate::page::PageQuery;
use crate::transport::{FetchRequest, FetchStatus, RawFetchResult, Transport};

/// Request settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    /// Browser-like `User-Agent` for scraped pages.
    pub user_agent: String,
}

impl FetchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Collaborators and read-only settings handed to adapters.
pub struct SourceContext {
    pub transport: Arc<dyn Transport>,
    pub pages: Arc<dyn PageQuery>,
    pub credentials: Credentials,
    pub settings: FetchSettings,
}

/// Turns a product descriptor into a price.
///
/// - `Ok(Some(price))`: a price was extracted.
/// - `Ok(None)`: benign "no price found". Only [`GenericSelectorAdapter`]
///   returns this; every other adapter reports a classified error instead.
/// - `Err(_)`: classified failure.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_type(&self) -> SourceType;

    async fn extract(&self, descriptor: &ProductDescriptor)
        -> Result<Option<Decimal>, AdapterError>;
}

/// Builds one adapter per source type from application config.
#[must_use]
pub fn default_adapters(
    context: &Arc<SourceContext>,
    config: &AppConfig,
) -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(TimeSeriesAdapter::new(
            Arc::clone(context),
            &config.timeseries_base_url,
            &config.timeseries_domain,
        )),
        Box::new(MarketplaceAdapter::new(
            Arc::clone(context),
            &config.marketplace_base_url,
        )),
        Box::new(StructuredPageAdapter::new(Arc::clone(context))),
        Box::new(GenericSelectorAdapter::new(Arc::clone(context))),
    ]
}

pub(crate) fn require_param<'a>(
    descriptor: &'a ProductDescriptor,
    key: &str,
) -> Result<&'a str, AdapterError> {
    descriptor
        .param(key)
        .ok_or_else(|| AdapterError::missing_param(key))
}

/// Unauthenticated page request with browser-like headers.
pub(crate) fn browser_request(url: &str, settings: &FetchSettings) -> FetchRequest {
    FetchRequest::get(url, settings.timeout)
        .with_header("User-Agent", &settings.user_agent)
        .with_header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .with_header("Accept-Language", "fr-FR,fr;q=0.9,en;q=0.8")
}

/// Returns the body of a successful fetch, or a `TransportFailure`.
pub(crate) fn success_body(
    result: RawFetchResult,
    request: &FetchRequest,
) -> Result<String, AdapterError> {
    match result.status {
        FetchStatus::Success => Ok(result.body),
        FetchStatus::HttpError(code) => Err(AdapterError::new(
            ErrorReason::TransportFailure,
            format!("HTTP {code} from {}", request.display_url()),
        )),
        FetchStatus::NetworkError(message) => {
            Err(AdapterError::new(ErrorReason::TransportFailure, message))
        }
    }
}

/// A zero amount is a placeholder, not a price.
pub(crate) fn positive_price(price: Decimal) -> Option<Decimal> {
    (price > Decimal::ZERO).then_some(price)
}

/// Converts an amount in minor currency units to major units.
pub(crate) fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
