// Modular translation architecture
//
// This module provides translation through a factory pattern:
// - Http: a remote translation service
// - Null: identity passthrough when translation is disabled or pointless
//
// Translation failure is never fatal for a chunk: the pipeline falls back
// to the recognized text, so the only error variant is Unavailable.

pub mod http;
pub mod noop;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TranslateConfig;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("translation unavailable: {0}")]
    Unavailable(String),
}

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` between the given language codes. Codes are passed
    /// through to the service without validation.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> std::result::Result<String, TranslationError>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator for the configured endpoint. Falls back to the
    /// identity translator when no endpoint is configured or the source and
    /// target languages already match.
    pub fn create(config: TranslateConfig) -> Box<dyn Translator> {
        if config.endpoint.is_empty() || config.source_lang == config.target_lang {
            Box::new(noop::NullTranslator)
        } else {
            Box::new(http::HttpTranslator::new(config))
        }
    }
}
