//! Ordered extraction strategies.
//!
//! Each adapter declares its fallback chain as a static slice of
//! [`Strategy`] values. [`first_success`] runs them one at a time and stops at
//! the first price; results are never combined.

use rust_decimal::Decimal;

use crate::error::AdapterError;

/// Outcome of one strategy: `Ok(Some)` wins, `Ok(None)` passes to the next
/// strategy, `Err` ends the chain.
pub type StrategyResult = Result<Option<Decimal>, AdapterError>;

/// A named, pure extraction step over payload `P`.
pub struct Strategy<P: ?Sized> {
    pub name: &'static str,
    pub run: fn(&P) -> StrategyResult,
}

impl<P: ?Sized> std::fmt::Debug for Strategy<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Runs `strategies` in order against `payload`.
///
/// Returns the winning strategy's name with its price, `Ok(None)` when every
/// strategy passed, or the first error.
///
/// # Errors
///
/// Propagates the first [`AdapterError`] a strategy returns; later strategies
/// are not attempted.
pub fn first_success<P: ?Sized>(
    payload: &P,
    strategies: &[Strategy<P>],
) -> Result<Option<(&'static str, Decimal)>, AdapterError> {
    for strategy in strategies {
        match (strategy.run)(payload)? {
            Some(price) => {
                tracing::debug!(strategy = strategy.name, %price, "strategy matched");
                return Ok(Some((strategy.name, price)));
            }
            None => tracing::trace!(strategy = strategy.name, "strategy yielded nothing"),
        }
    }
    Ok(None)
}
