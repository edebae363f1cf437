//! Product catalog: the ordered list of products to price on each run.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Kind of source a product's price is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Price-history API keyed by catalog id (`asin`).
    TimeSeries,
    /// Marketplace offer API keyed by product id or slug (`sku`).
    Marketplace,
    /// Marketplace product page with a known price layout (`url`).
    StructuredPage,
    /// Arbitrary page with a caller-supplied selector (`url`, `selector`).
    GenericSelector,
}

impl SourceType {
    pub const ALL: [SourceType; 4] = [
        SourceType::TimeSeries,
        SourceType::Marketplace,
        SourceType::StructuredPage,
        SourceType::GenericSelector,
    ];

    /// Params that must be present on a descriptor of this type.
    #[must_use]
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            SourceType::TimeSeries => &["asin"],
            SourceType::Marketplace => &["sku"],
            SourceType::StructuredPage => &["url"],
            SourceType::GenericSelector => &["url", "selector"],
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::TimeSeries => write!(f, "time_series"),
            SourceType::Marketplace => write!(f, "marketplace"),
            SourceType::StructuredPage => write!(f, "structured_page"),
            SourceType::GenericSelector => write!(f, "generic_selector"),
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    /// Accepts the canonical snake_case names and the vendor names used in
    /// older catalogs (`keepa`, `backmarket`, `cdiscount`, `generic_scrape`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time_series" | "keepa" => Ok(SourceType::TimeSeries),
            "marketplace" | "backmarket" => Ok(SourceType::Marketplace),
            "structured_page" | "cdiscount" => Ok(SourceType::StructuredPage),
            "generic_selector" | "generic_scrape" => Ok(SourceType::GenericSelector),
            other => Err(format!("unknown source type '{other}'")),
        }
    }
}

/// One catalog entry.
///
/// `source_type` keeps the declared spelling so that an unrecognised type is
/// reported per product at extraction time instead of rejecting the whole
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(flatten, deserialize_with = "scalar_params")]
    pub params: BTreeMap<String, String>,
}

/// Reads source params as text; numbers and booleans keep their YAML
/// spelling, `null` becomes an empty (absent) value.
fn scalar_params<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => {
                    return Err(serde::de::Error::custom(format!(
                        "param '{key}' must be a scalar value"
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

impl ProductDescriptor {
    #[must_use]
    pub fn new(name: &str, source_type: &str) -> Self {
        Self {
            name: name.to_owned(),
            source_type: source_type.to_owned(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style helper for adding a source param.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_owned(), value.to_owned());
        self
    }

    /// The declared type, if it names a supported source.
    #[must_use]
    pub fn kind(&self) -> Option<SourceType> {
        self.source_type.parse().ok()
    }

    /// Returns a param value, treating blank values as absent.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductDescriptor>,
}

/// Load and validate the product catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile =
        serde_yaml::from_str(content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    for product in &catalog.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }

        // Unknown types are left for the engine to report.
        let Some(kind) = product.kind() else {
            continue;
        };

        for key in kind.required_params() {
            if product.param(key).is_none() {
                return Err(ConfigError::Validation(format!(
                    "product '{}' ({kind}) is missing required param '{key}'",
                    product.name
                )));
            }
        }

        if let Some(url) = product.param("url") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "product '{}' has non-http url '{url}'",
                    product.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
