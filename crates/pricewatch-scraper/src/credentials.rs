use std::collections::BTreeMap;

use pricewatch_core::{AppConfig, MARKETPLACE_API_TOKEN, TIMESERIES_API_KEY};

/// Read-only secret lookup by name.
///
/// A missing credential is a normal condition: adapters that need it report
/// a `MissingCredential` failure before making any request.
#[derive(Clone, Default)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Collects the API credentials present in `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let mut credentials = Self::new();
        if let Some(key) = &config.timeseries_api_key {
            credentials = credentials.with(TIMESERIES_API_KEY, key);
        }
        if let Some(token) = &config.marketplace_api_token {
            credentials = credentials.with(MARKETPLACE_API_TOKEN, token);
        }
        credentials
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|k| (k, "[redacted]")))
            .finish()
    }
}
