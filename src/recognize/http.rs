use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{RecognitionError, Recognizer};
use crate::config::RecognizerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResponse {
    pub text: String,
}

/// Recognizer backed by a remote HTTP service.
///
/// Every request carries a bounded timeout; expiry surfaces as
/// `ServiceUnavailable` like any other transport failure.
pub struct HttpRecognizer {
    client: Client,
    config: RecognizerConfig,
}

impl HttpRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self { client, config }
    }
}

#[async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(
        &self,
        audio_path: &Path,
        language: &str,
    ) -> std::result::Result<String, RecognitionError> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            RecognitionError::ServiceUnavailable(format!(
                "Failed to read chunk {}: {}",
                audio_path.display(),
                e
            ))
        })?;

        let url = format!("{}/v1/recognize", self.config.endpoint);
        debug!("Sending recognition request to: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("language", language)])
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio)
            .send()
            .await
            .map_err(|e| RecognitionError::ServiceUnavailable(format!("HTTP request failed: {}", e)))?;

        // The service reports low-confidence audio it cannot transcribe
        // as 422; anything else non-2xx is a service fault.
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RecognitionError::Unintelligible);
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::ServiceUnavailable(format!(
                "Recognition API error {}: {}",
                status, error_text
            )));
        }

        let body: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::ServiceUnavailable(format!("Failed to parse response: {}", e)))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(RecognitionError::Unintelligible);
        }

        Ok(text)
    }
}
