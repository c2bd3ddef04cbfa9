//! Startup configuration, loaded once from `config.json`.
//!
//! Everything environment-specific lives here: URLs, credentials, the
//! translation key, browser paths, state-file locations. Nothing in this
//! file is compiled into the sequences.

use crate::batch::FailurePolicy;
use crate::error::SyncError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    #[serde(alias = "USERNAME")]
    pub username: String,
    #[serde(alias = "PASSWORD")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(alias = "BROWSER_WIDTH_RATIO", default = "default_width_ratio")]
    pub browser_width_ratio: f64,
    #[serde(alias = "BROWSER_HEIGHT_RATIO", default = "default_height_ratio")]
    pub browser_height_ratio: f64,
    #[serde(alias = "MIN_BROWSER_HEIGHT", default = "default_min_height")]
    pub min_browser_height: u32,
    #[serde(alias = "ZOOM_STEP_PCT", default = "default_zoom_step")]
    pub zoom_step_pct: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            browser_width_ratio: default_width_ratio(),
            browser_height_ratio: default_height_ratio(),
            min_browser_height: default_min_height(),
            zoom_step_pct: default_zoom_step(),
        }
    }
}

fn default_width_ratio() -> f64 {
    0.80
}

fn default_height_ratio() -> f64 {
    1.00
}

fn default_min_height() -> u32 {
    950
}

fn default_zoom_step() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(alias = "CRM_URL")]
    pub crm_url: String,
    #[serde(alias = "SHOP_URL")]
    pub shop_url: String,

    #[serde(alias = "GECKODRIVER_PATH", default = "default_geckodriver")]
    pub geckodriver_path: PathBuf,
    #[serde(alias = "FIREFOX_BINARY", default)]
    pub firefox_binary: Option<String>,
    #[serde(alias = "FIREFOX_PROFILE", default)]
    pub firefox_profile: Option<String>,
    #[serde(alias = "WEBDRIVER_PORT", default = "default_webdriver_port")]
    pub webdriver_port: u16,

    #[serde(alias = "DEEPL_AUTH_KEY")]
    pub deepl_auth_key: String,
    #[serde(alias = "DEEPL_API_URL", default)]
    pub deepl_api_url: Option<String>,

    /// CRM accounts the operator can pick from at login.
    #[serde(alias = "TRICOMA", default)]
    pub tricoma: BTreeMap<String, Credential>,
    /// Shop accounts the operator can pick from at login.
    #[serde(alias = "SHOPWARE", default)]
    pub shopware: BTreeMap<String, Credential>,

    #[serde(alias = "PRODUCT_DATA_FILE", default = "default_record_file")]
    pub record_file: PathBuf,
    #[serde(alias = "PRODUCT_LIST_FILE", default = "default_queue_file")]
    pub queue_file: PathBuf,
    #[serde(alias = "PRODUCT_COUNTER_FILE", default = "default_counter_file")]
    pub counter_file: PathBuf,
    #[serde(alias = "PAUSE_FILE", default = "default_pause_file")]
    pub pause_file: PathBuf,
    #[serde(alias = "LOGIN_MARKER_FILE", default = "default_login_marker")]
    pub login_marker_file: PathBuf,

    #[serde(alias = "FAILURE_POLICY", default)]
    pub failure_policy: FailurePolicy,

    #[serde(alias = "LAYOUT", default)]
    pub layout: LayoutConfig,
}

fn default_geckodriver() -> PathBuf {
    PathBuf::from("./geckodriver")
}

fn default_webdriver_port() -> u16 {
    4444
}

fn default_record_file() -> PathBuf {
    PathBuf::from("product_data.json")
}

fn default_queue_file() -> PathBuf {
    PathBuf::from("products.txt")
}

fn default_counter_file() -> PathBuf {
    PathBuf::from("product_counter.txt")
}

fn default_pause_file() -> PathBuf {
    PathBuf::from("pause.txt")
}

fn default_login_marker() -> PathBuf {
    PathBuf::from("login_user.txt")
}

pub fn load(path: &Path) -> Result<Config, SyncError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        SyncError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let config: Config = serde_json::from_str(&raw)
        .map_err(|e| SyncError::Config(format!("cannot parse {}: {e}", path.display())))?;
    info!("configuration loaded from {}", path.display());
    Ok(config)
}
