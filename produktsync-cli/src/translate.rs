//! DeepL translation client.
//!
//! One request per language per product, no retry. Markup is preserved by
//! the service (`tag_handling=html`); only text nodes are translated. Any
//! service error degrades to an empty string so a translation outage never
//! aborts the pipeline — callers must read empty as "translation
//! unavailable", not "source was empty".

use crate::record::ProductRecord;
use serde::Deserialize;
use tracing::{error, info, warn};

pub const DEFAULT_API_URL: &str = "https://api-free.deepl.com/v2/translate";

pub struct Translator {
    http: reqwest::Client,
    api_url: String,
    auth_key: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

impl Translator {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self::with_api_url(auth_key, DEFAULT_API_URL)
    }

    pub fn with_api_url(auth_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            auth_key: auth_key.into(),
        }
    }

    /// Translate one string into `target_lang`, returning an empty string
    /// on any service failure.
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        match self.request(text, target_lang).await {
            Ok(translated) => {
                info!("translation to {target_lang} completed");
                translated
            }
            Err(e) => {
                error!("translation to {target_lang} failed: {e}");
                String::new()
            }
        }
    }

    async fn request(&self, text: &str, target_lang: &str) -> Result<String, reqwest::Error> {
        let params = [
            ("text", text),
            ("target_lang", target_lang),
            ("tag_handling", "html"),
        ];
        let response = self
            .http
            .post(&self.api_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("DeepL-Auth-Key {}", self.auth_key),
            )
            .form(&params)
            .send()
            .await?
            .error_for_status()?;
        let body: TranslateResponse = response.json().await?;
        Ok(body
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .unwrap_or_default())
    }

    /// Fill the localized description fields. With no source description
    /// the service is not contacted and both fields stay absent.
    pub async fn translate_product(&self, record: &mut ProductRecord) {
        let description = match record.beschreibung.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => {
                warn!("no product description to translate");
                return;
            }
        };
        let english = self.translate(&description, "EN-GB").await;
        let french = self.translate(&description, "FR").await;
        for (lang, translated) in [("EN-GB", &english), ("FR", &french)] {
            if translated.is_empty() {
                warn!(
                    "empty {lang} translation for {:?}; the Shop description will be blanked on upload",
                    record.artikelnummer
                );
            }
        }
        record.beschreibung_en = Some(english);
        record.beschreibung_fr = Some(french);
    }
}
