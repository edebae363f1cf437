//! `check` command: validate config and catalog without fetching anything.

use std::collections::BTreeMap;

use pricewatch_core::{AppConfig, ProductDescriptor, SourceType};

/// Load the catalog and print a per-source summary with warnings for
/// products that cannot run as configured.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or fails validation.
pub(crate) fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = pricewatch_core::load_catalog(&config.catalog_path)?;

    println!("environment: {}", config.env);
    println!("catalog: {}", config.catalog_path.display());
    println!("output: {}", config.output_path.display());
    for line in catalog_report(config, &catalog.products) {
        println!("{line}");
    }
    Ok(())
}

/// One line per declared source type, then one warning per product that
/// would fail before reaching the network.
pub(crate) fn catalog_report(config: &AppConfig, products: &[ProductDescriptor]) -> Vec<String> {
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for product in products {
        *by_type.entry(product.source_type.as_str()).or_default() += 1;
    }

    let mut lines: Vec<String> = by_type
        .iter()
        .map(|(source_type, count)| format!("{source_type}: {count} product(s)"))
        .collect();

    for product in products {
        let warning = match product.kind() {
            None => Some(format!("unknown source type \"{}\"", product.source_type)),
            Some(SourceType::TimeSeries) if config.timeseries_api_key.is_none() => {
                Some(format!("{} is not set", pricewatch_core::TIMESERIES_API_KEY))
            }
            Some(SourceType::Marketplace) if config.marketplace_api_token.is_none() => {
                Some(format!("{} is not set", pricewatch_core::MARKETPLACE_API_TOKEN))
            }
            Some(_) => None,
        };
        if let Some(warning) = warning {
            tracing::warn!(product = %product.name, "{warning}");
            lines.push(format!("warning: {}: {warning}", product.name));
        }
    }

    lines
}
