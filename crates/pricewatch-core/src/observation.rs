use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A successfully extracted price, ready to be appended to the log.
///
/// Only ever constructed from a parsed, non-negative price; there is no
/// placeholder or zero value for "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub product_name: String,
    /// Major currency units, e.g. `799.99`.
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Creates an observation stamped with the current UTC time.
    #[must_use]
    pub fn new(product_name: &str, price: Decimal) -> Self {
        Self::at(product_name, price, Utc::now())
    }

    #[must_use]
    pub fn at(product_name: &str, price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            product_name: product_name.to_owned(),
            price,
            observed_at,
        }
    }

    /// Price with exactly two fractional digits, as written to the log.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format!("{:.2}", self.price.round_dp(2))
    }

    /// ISO-8601 UTC timestamp, e.g. `2026-10-16T08:30:00Z`.
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.observed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn observation(price: &str) -> PriceObservation {
        let ts = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        PriceObservation::at("Pixel 8a", Decimal::from_str(price).unwrap(), ts)
    }

    #[test]
    fn formatted_price_pads_to_two_digits() {
        assert_eq!(observation("459").formatted_price(), "459.00");
        assert_eq!(observation("199.5").formatted_price(), "199.50");
        assert_eq!(observation("1234.56").formatted_price(), "1234.56");
    }

    #[test]
    fn formatted_price_rounds_extra_digits() {
        assert_eq!(observation("12.344").formatted_price(), "12.34");
        assert_eq!(observation("12.346").formatted_price(), "12.35");
    }

    #[test]
    fn formatted_timestamp_is_utc_iso8601() {
        assert_eq!(observation("1").formatted_timestamp(), "2026-10-16T08:30:00Z");
    }

    #[test]
    fn formatted_price_reparses_to_original() {
        let obs = observation("799.99");
        let reparsed = Decimal::from_str(&obs.formatted_price()).unwrap();
        assert_eq!(reparsed, obs.price);
    }
}
