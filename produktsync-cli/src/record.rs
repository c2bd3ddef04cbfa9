//! The product record and its on-disk snapshot.
//!
//! The snapshot splits the pipeline into independently resumable stages:
//! extraction writes it, translation enriches it, upload consumes it
//! read-only. One record is in flight at a time; the file is overwritten
//! wholesale on every save.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// A product as extracted from the CRM, field names matching the CRM's own
/// vocabulary. Fields the extraction could not read stay `None` and are
/// absent from the snapshot; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artikelnummer: Option<String>,
    /// Packaging unit count, string-encoded as the CRM renders it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verpackungseinheit: Option<String>,
    /// Source-language description HTML, inline styles stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung_fr: Option<String>,
    #[serde(rename = "titel_FRA", default, skip_serializing_if = "Option::is_none")]
    pub titel_fra: Option<String>,
    #[serde(rename = "titel_GBR", default, skip_serializing_if = "Option::is_none")]
    pub titel_gbr: Option<String>,
    /// Dealer net price, `"<int>.<frac>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_preis: Option<String>,
    /// End-customer net price, `"<int>.<frac>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endkunde_preis: Option<String>,

    /// Catch-all for fields a future CRM revision may surface.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ProductRecord {
    /// The article number, if present and non-empty. This is the hard
    /// precondition of the Shop search boundary.
    pub fn identifier(&self) -> Option<&str> {
        self.artikelnummer.as_deref().filter(|s| !s.is_empty())
    }
}

pub fn load(path: &Path) -> Result<ProductRecord, SyncError> {
    let raw = fs::read_to_string(path)?;
    let record = serde_json::from_str(&raw)?;
    info!("product record loaded from {}", path.display());
    Ok(record)
}

pub fn save(path: &Path, record: &ProductRecord) -> Result<(), SyncError> {
    let mut pretty = serde_json::to_string_pretty(record)?;
    pretty.push('\n');
    fs::write(path, pretty)?;
    info!("product record saved to {}", path.display());
    Ok(())
}

/// Operator-facing summary after the translate stage.
pub fn print_summary(record: &ProductRecord) {
    println!("\n--- Product record summary ---");
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(fields)) => {
            for (key, value) in fields {
                let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                let shown: String = value.chars().take(120).collect();
                if shown.len() < value.len() {
                    println!("{key}: {shown}…");
                } else {
                    println!("{key}: {shown}");
                }
            }
        }
        _ => error!("record could not be rendered for the summary"),
    }
    println!("--- End of summary ---");
}
