//! Response types for the two JSON price APIs.
//!
//! ## Price-history API (Keepa `GET /product`)
//!
//! Prices are integers in minor currency units (cents). Keepa uses negative
//! sentinels for "no offer" (`-1`) and "no data" (`-2`); those are treated as
//! absent, never as a price.
//!
//! ### `csv`
//! Array of price histories indexed by price type; index `1` is the lowest
//! NEW offer. Each history is a flat array of `[keepa_time, price, ...]`
//! pairs, oldest first. Individual histories are `null` when Keepa has no
//! data for that type.
//!
//! ## Marketplace API (Back Market `GET /offers/{sku}`)
//!
//! The price object carries a display string (`raw`, e.g. `"199,50 €"` or
//! `"199.50"`) and a numeric `value`. Either may be missing; `value` has been
//! observed both as a JSON number and as a numeric string.

use serde::Deserialize;
use serde_json::Value;

/// Index of the NEW-offer history in [`KeepaProduct::csv`].
pub const KEEPA_CSV_NEW: usize = 1;

/// Top-level response from the price-history API.
#[derive(Debug, Deserialize)]
pub struct KeepaResponse {
    #[serde(default)]
    pub products: Vec<KeepaProduct>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeepaProduct {
    /// Current buy-box price in cents. Only present when the request asked
    /// for buy-box data; `null` or negative when there is no buy box.
    #[serde(default, rename = "buyBoxPrice")]
    pub buy_box_price: Option<i64>,

    /// Price histories by type, see module docs.
    #[serde(default)]
    pub csv: Option<Vec<Option<Vec<i64>>>>,

    /// Manufacturer list price in cents.
    #[serde(default, rename = "listPrice")]
    pub list_price: Option<i64>,
}

impl KeepaProduct {
    /// Most recent price in the NEW-offer history, if any.
    #[must_use]
    pub fn latest_new_price(&self) -> Option<i64> {
        let history = self.csv.as_ref()?.get(KEEPA_CSV_NEW)?.as_ref()?;
        // Pairs of [time, price]; the price is every second element.
        history.chunks_exact(2).last().map(|pair| pair[1])
    }
}

/// Top-level response from the marketplace offer API.
#[derive(Debug, Deserialize)]
pub struct OfferResponse {
    #[serde(default)]
    pub price: Option<OfferPrice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferPrice {
    #[serde(default)]
    pub raw: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}
