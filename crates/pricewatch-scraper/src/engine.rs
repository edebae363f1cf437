//! Catalog-level orchestration: dispatch, pacing, recording, reporting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_core::{AppConfig, PriceObservation, ProductDescriptor, SourceType};
use tokio_util::sync::CancellationToken;

use crate::adapters::{default_adapters, FetchSettings, SourceAdapter, SourceContext};
use crate::credentials::Credentials;
use crate::error::{ErrorReason, ExtractionError};
use crate::outcome::{ExtractionOutcome, RunSummary};
use crate::page::PageQuery;
use crate::recorder::ObservationRecorder;
use crate::transport::Transport;

/// Runs products through the adapter registered for their source type.
///
/// Products are processed one at a time in catalog order, with `pacing`
/// between consecutive products, so outbound requests are never concurrent.
pub struct PriceExtractionEngine {
    adapters: HashMap<SourceType, Box<dyn SourceAdapter>>,
    pacing: Duration,
}

impl PriceExtractionEngine {
    /// An engine with no adapters; every product is an unknown source type
    /// until adapters are registered.
    #[must_use]
    pub fn new(pacing: Duration) -> Self {
        Self {
            adapters: HashMap::new(),
            pacing,
        }
    }

    /// Wires the four production adapters from application config.
    #[must_use]
    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        pages: Arc<dyn PageQuery>,
    ) -> Self {
        let context = Arc::new(SourceContext {
            transport,
            pages,
            credentials: Credentials::from_config(config),
            settings: FetchSettings::from_config(config),
        });

        let mut engine = Self::new(Duration::from_millis(config.inter_request_delay_ms));
        for adapter in default_adapters(&context, config) {
            engine.register(adapter);
        }
        engine
    }

    /// Registers `adapter` for its source type, returning any adapter it
    /// replaces.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) -> Option<Box<dyn SourceAdapter>> {
        self.adapters.insert(adapter.source_type(), adapter)
    }

    #[must_use]
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Extracts one product. Never fails: every error becomes a
    /// [`ExtractionOutcome::Failure`].
    pub async fn extract_one(&self, descriptor: &ProductDescriptor) -> ExtractionOutcome {
        let Some(adapter) = descriptor.kind().and_then(|kind| self.adapters.get(&kind)) else {
            return ExtractionOutcome::Failure(ExtractionError {
                product_name: descriptor.name.clone(),
                reason: ErrorReason::UnknownSourceType,
                detail: format!("no adapter for source type \"{}\"", descriptor.source_type),
            });
        };

        match adapter.extract(descriptor).await {
            Ok(Some(price)) => {
                ExtractionOutcome::Observation(PriceObservation::new(&descriptor.name, price))
            }
            Ok(None) => ExtractionOutcome::NoPriceFound {
                product_name: descriptor.name.clone(),
            },
            Err(err) => {
                ExtractionOutcome::Failure(ExtractionError::from_adapter(&descriptor.name, err))
            }
        }
    }

    /// One pass over `catalog`, returning one outcome per processed product in
    /// catalog order.
    ///
    /// Observations are handed to `recorder` as they are produced. When
    /// `cancel` fires, the pass stops before the next product, interrupting
    /// the pacing delay; an in-flight fetch is bounded by its own timeout.
    pub async fn run_once(
        &self,
        catalog: &[ProductDescriptor],
        recorder: &mut dyn ObservationRecorder,
        cancel: &CancellationToken,
    ) -> Vec<ExtractionOutcome> {
        let mut outcomes = Vec::with_capacity(catalog.len());

        for (idx, descriptor) in catalog.iter().enumerate() {
            if idx > 0 && !self.pacing.is_zero() {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(self.pacing) => {}
                }
            }
            if cancel.is_cancelled() {
                tracing::warn!(
                    processed = idx,
                    remaining = catalog.len() - idx,
                    "run cancelled"
                );
                break;
            }

            let outcome = match self.extract_one(descriptor).await {
                ExtractionOutcome::Observation(observation) => {
                    record(recorder, observation)
                }
                other => other,
            };
            report(descriptor, &outcome);
            outcomes.push(outcome);
        }

        let summary = RunSummary::from_outcomes(&outcomes);
        tracing::info!(
            observed = summary.observed,
            not_found = summary.not_found,
            failed = summary.failed,
            catalog = catalog.len(),
            "run complete"
        );
        outcomes
    }
}

fn record(recorder: &mut dyn ObservationRecorder, observation: PriceObservation) -> ExtractionOutcome {
    match recorder.append(observation.clone()) {
        Ok(()) => ExtractionOutcome::Observation(observation),
        Err(err) => ExtractionOutcome::Failure(ExtractionError {
            product_name: observation.product_name,
            reason: ErrorReason::RecordFailure,
            detail: err.to_string(),
        }),
    }
}

fn report(descriptor: &ProductDescriptor, outcome: &ExtractionOutcome) {
    let source_type = descriptor.source_type.as_str();
    match outcome {
        ExtractionOutcome::Observation(obs) => tracing::info!(
            product = %obs.product_name,
            source_type,
            price = %obs.formatted_price(),
            "price observed"
        ),
        ExtractionOutcome::NoPriceFound { product_name } => tracing::warn!(
            product = %product_name,
            source_type,
            "no price found"
        ),
        ExtractionOutcome::Failure(err) => tracing::warn!(
            product = %err.product_name,
            source_type,
            reason = %err.reason,
            error = %err.detail,
            "extraction failed"
        ),
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
