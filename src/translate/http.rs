use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TranslationError, Translator};
use crate::config::TranslateConfig;

#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    pub q: String,
    pub source: String,
    pub target: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Translator backed by a remote HTTP service.
pub struct HttpTranslator {
    client: Client,
    config: TranslateConfig,
}

impl HttpTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self { client, config }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> std::result::Result<String, TranslationError> {
        let request = TranslationRequest {
            q: text.to_string(),
            source: source_lang.to_string(),
            target: target_lang.to_string(),
            format: "text".to_string(),
        };

        let url = format!("{}/translate", self.config.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranslationError::Unavailable(format!(
                "Translation API error {}: {}",
                status, error_text
            )));
        }

        let body: TranslationResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Unavailable(format!("Failed to parse response: {}", e)))?;

        let translated = body.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(TranslationError::Unavailable(
                "Empty translation received".to_string(),
            ));
        }

        Ok(translated)
    }
}
