//! Gross price derivation for the Shop's end-customer field.
//!
//! The CRM stores net prices; the Shop wants gross. Gross is net plus 19%
//! VAT rounded to cents, then snapped to the nearest 0.05 step (retail
//! price ending convention).

use crate::error::SyncError;

pub const VAT_FACTOR: f64 = 1.19;
pub const PRICE_STEP: f64 = 0.05;

/// Strict parse of a CRM price string: digits, at most one decimal point,
/// at most two fractional digits. Anything else is a validation failure,
/// never a silent zero.
pub fn parse_price(raw: &str) -> Result<f64, SyncError> {
    let trimmed = raw.trim();
    if !well_formed(trimmed) {
        return Err(SyncError::InvalidPrice(raw.to_string()));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| SyncError::InvalidPrice(raw.to_string()))
}

fn well_formed(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    let whole_ok = !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit());
    let fraction_ok = match fraction {
        None => true,
        Some(f) => !f.is_empty() && f.len() <= 2 && f.bytes().all(|b| b.is_ascii_digit()),
    };
    whole_ok && fraction_ok
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Net price to gross, rounded to cents.
pub fn gross_price(net: f64) -> f64 {
    round2(net * VAT_FACTOR)
}

/// Snap to the nearest 0.05 multiple, rounded back to cents.
pub fn adjust_to_step(gross: f64) -> f64 {
    round2((gross / PRICE_STEP).round() * PRICE_STEP)
}

/// The full derivation from the CRM's end-customer net price string.
pub fn retail_gross(endkunde_preis: &str) -> Result<f64, SyncError> {
    Ok(adjust_to_step(gross_price(parse_price(endkunde_preis)?)))
}

pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}
