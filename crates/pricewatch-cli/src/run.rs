//! `run` command: one extraction pass over the catalog.
//!
//! Per-product failures are reported and skipped; only setup problems
//! (config, catalog, HTTP client) make the command fail.

use std::sync::Arc;

use pricewatch_core::{AppConfig, ProductDescriptor};
use pricewatch_scraper::{
    CsvRecorder, HtmlPageQuery, HttpTransport, MemoryRecorder, PriceExtractionEngine, RunSummary,
};
use tokio_util::sync::CancellationToken;

/// Run the catalog once and print one line per outcome.
///
/// When `dry_run` is `true` observations are kept in memory and the price
/// log is left untouched.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the product filter
/// matches nothing, or the HTTP transport cannot be built.
pub(crate) async fn run_prices(
    config: &AppConfig,
    product_filter: Option<&str>,
    dry_run: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let catalog = pricewatch_core::load_catalog(&config.catalog_path)?;
    let products = select_products(catalog.products, product_filter)?;

    let transport = HttpTransport::new(
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP transport: {e}"))?;
    let engine =
        PriceExtractionEngine::from_config(config, Arc::new(transport), Arc::new(HtmlPageQuery));

    tracing::info!(
        products = products.len(),
        dry_run,
        output = %config.output_path.display(),
        pacing_ms = engine.pacing().as_millis(),
        "starting price run"
    );

    let outcomes = if dry_run {
        let mut recorder = MemoryRecorder::new();
        engine.run_once(&products, &mut recorder, cancel).await
    } else {
        let mut recorder = CsvRecorder::new(&config.output_path);
        engine.run_once(&products, &mut recorder, cancel).await
    };

    let prefix = if dry_run { "dry-run: " } else { "" };
    for outcome in &outcomes {
        println!("{prefix}{outcome}");
    }

    let summary = RunSummary::from_outcomes(&outcomes);
    println!(
        "{prefix}{} observed, {} without price, {} failed ({} of {} products)",
        summary.observed,
        summary.not_found,
        summary.failed,
        summary.total(),
        products.len()
    );
    if cancel.is_cancelled() {
        println!("{prefix}run cancelled before completion");
    }

    Ok(())
}

/// Keep catalog order; with a filter, keep only entries whose name matches
/// case-insensitively.
pub(crate) fn select_products(
    products: Vec<ProductDescriptor>,
    filter: Option<&str>,
) -> anyhow::Result<Vec<ProductDescriptor>> {
    let Some(name) = filter else {
        return Ok(products);
    };

    let selected: Vec<ProductDescriptor> = products
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .collect();
    if selected.is_empty() {
        anyhow::bail!("product '{name}' not found in catalog");
    }
    Ok(selected)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
