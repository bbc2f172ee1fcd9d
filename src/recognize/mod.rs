// Modular recognition architecture
//
// This module provides speech recognition through a factory pattern:
// - Http: a remote recognition service speaking a small JSON contract
//
// To add a new recognition backend, implement the Recognizer trait and add
// it to the factory.

pub mod http;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::config::RecognizerConfig;

/// Chunk-level recognition failure.
///
/// Both variants are terminal for the chunk and recoverable for the run:
/// the pipeline counts the chunk as invalid and moves on. There is no
/// automatic retry; a failed chunk is permanently skipped so a run stays a
/// single linear pass.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("could not understand audio")]
    Unintelligible,

    #[error("recognition service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Main trait for recognition operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Transcribe one exported chunk. The language tag is passed through to
    /// the service without validation.
    async fn recognize(
        &self,
        audio_path: &Path,
        language: &str,
    ) -> std::result::Result<String, RecognitionError>;
}

/// Factory for creating recognizer instances
pub struct RecognizerFactory;

impl RecognizerFactory {
    pub fn create(config: RecognizerConfig) -> Box<dyn Recognizer> {
        Box::new(http::HttpRecognizer::new(config))
    }
}
