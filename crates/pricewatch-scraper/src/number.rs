//! Locale-tolerant price parsing shared by every source adapter.
//!
//! Catalog sources are mostly French storefronts, so `1.234,56 €` and
//! `799,99` are the common shapes, but normalized values like `1234.56` must
//! parse to the same number.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::NumberParseError;

/// Digit groups joined by single separators. NBSP, narrow NBSP and a plain
/// space are French thousands separators; a plain space only joins a group
/// of exactly three digits.
static PRICE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:[.,\u{a0}\u{202f}][0-9]+| [0-9]{3})*").expect("valid price run regex")
});

static LOOSE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9,.]*[0-9][0-9,.]*").expect("valid loose run regex"));

static CURRENCY_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([0-9]+(?:[.,\u{a0}\u{202f}][0-9]+| [0-9]{3})*)[ \u{a0}\u{202f}]?(?:€|EUR|\$|£)",
    )
    .expect("valid currency amount regex")
});

/// Parses the first price-like number in `text`.
///
/// Separator rules:
/// - both `.` and `,` present: the last one is the decimal point, the rest
///   are grouping (`1.234,56` → `1234.56`, `1,234.56` → `1234.56`)
/// - one separator kind, repeated: grouping (`1.234.567` → `1234567`)
/// - one separator, once: decimal, unless it reads as a thousands group, i.e.
///   exactly three digits after and one to three digits before, not starting
///   with `0` (`1.234` → `1234`, `799,99` → `799.99`, `0.500` → `0.5`)
/// - spaces (plain, NBSP, narrow NBSP) between digit groups are grouping
///   (`1 299,00` → `1299.00`)
///
/// # Errors
///
/// [`NumberParseError::NoDigits`] when `text` has no digit,
/// [`NumberParseError::Invalid`] when the cleaned candidate is not a finite
/// decimal (e.g. it overflows).
pub fn parse_price(text: &str) -> Result<Decimal, NumberParseError> {
    let found = PRICE_RUN_RE
        .find(text)
        .ok_or_else(|| NumberParseError::NoDigits(text.trim().to_owned()))?;
    let run = without_partial_space_group(found.as_str(), &text[found.end()..]);

    let normalized = normalize_separators(run);
    Decimal::from_str(&normalized).map_err(|e| NumberParseError::Invalid {
        candidate: run.to_owned(),
        reason: e.to_string(),
    })
}

/// Looser parse for caller-tuned selectors: the first run of digits, commas
/// and points, with every comma read as a decimal point.
///
/// Returns `Ok(None)` when `text` has no digit.
///
/// # Errors
///
/// [`NumberParseError::Invalid`] when the run does not parse, e.g. `1.234,56`
/// becomes `1.234.56`.
pub fn parse_loose(text: &str) -> Result<Option<Decimal>, NumberParseError> {
    let Some(m) = LOOSE_RUN_RE.find(text) else {
        return Ok(None);
    };

    let candidate = m.as_str().replace(',', ".");
    let candidate = candidate.trim_end_matches('.');
    Decimal::from_str(candidate)
        .map(Some)
        .map_err(|e| NumberParseError::Invalid {
            candidate: m.as_str().to_owned(),
            reason: e.to_string(),
        })
}

/// Returns the first number in `text` directly followed by a currency
/// marker (`€`, `EUR`, `$`, `£`), without the marker.
#[must_use]
pub fn find_currency_amount(text: &str) -> Option<&str> {
    CURRENCY_AMOUNT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A space-joined group must end after three digits: in `1 2999` the space
/// separates two numbers, so only `1` is kept.
fn without_partial_space_group<'a>(run: &'a str, rest: &str) -> &'a str {
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        if let Some(pos) = run.rfind(' ') {
            return &run[..pos];
        }
    }
    run
}

fn normalize_separators(run: &str) -> String {
    let compact: String = run
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();

    let digits_only = |s: &str| -> String { s.chars().filter(char::is_ascii_digit).collect() };

    match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let decimal_at = dot.max(comma);
            let (int_part, frac) = compact.split_at(decimal_at);
            format!("{}.{}", digits_only(int_part), &frac[1..])
        }
        (Some(pos), None) | (None, Some(pos)) => {
            let sep = &compact[pos..=pos];
            if compact.matches(sep).count() > 1 {
                return digits_only(&compact);
            }
            let int_part = &compact[..pos];
            let frac = &compact[pos + 1..];
            let is_thousands_group =
                frac.len() == 3 && int_part.len() <= 3 && !int_part.starts_with('0');
            if is_thousands_group {
                format!("{int_part}{frac}")
            } else {
                format!("{int_part}.{frac}")
            }
        }
        (None, None) => compact,
    }
}

#[cfg(test)]
#[path = "number_test.rs"]
mod tests;
