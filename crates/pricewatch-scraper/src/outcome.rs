use pricewatch_core::PriceObservation;

use crate::error::{ErrorReason, ExtractionError};

/// Result of one product's extraction attempt.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Observation(PriceObservation),
    /// Benign miss from a selector-driven source.
    NoPriceFound { product_name: String },
    Failure(ExtractionError),
}

impl ExtractionOutcome {
    #[must_use]
    pub fn product_name(&self) -> &str {
        match self {
            Self::Observation(obs) => &obs.product_name,
            Self::NoPriceFound { product_name } => product_name,
            Self::Failure(err) => &err.product_name,
        }
    }

    #[must_use]
    pub fn observation(&self) -> Option<&PriceObservation> {
        match self {
            Self::Observation(obs) => Some(obs),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<ErrorReason> {
        match self {
            Self::Failure(err) => Some(err.reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl std::fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Observation(obs) => write!(f, "{}: {}", obs.product_name, obs.formatted_price()),
            Self::NoPriceFound { product_name } => write!(f, "{product_name}: no price found"),
            Self::Failure(err) => write!(f, "{}: {} ({})", err.product_name, err.reason, err.detail),
        }
    }
}

/// Per-run counts, logged once the catalog pass ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub observed: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[ExtractionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome {
                ExtractionOutcome::Observation(_) => acc.observed += 1,
                ExtractionOutcome::NoPriceFound { .. } => acc.not_found += 1,
                ExtractionOutcome::Failure(_) => acc.failed += 1,
            }
            acc
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.observed + self.not_found + self.failed
    }
}
