use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{JimakuError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub segmenter: SegmenterConfig,
    pub recognizer: RecognizerConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
    /// Working directory for extracted audio, exported chunks and logs
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Minimum contiguous silence (ms) that ends an utterance
    pub min_silence_ms: u64,
    /// Silence threshold, expressed as an offset below the clip's average
    /// loudness (dBFS). Detection adapts to the overall level of the clip.
    pub silence_offset_db: f64,
    /// Silence (ms) kept on both ends of each chunk so speech does not
    /// sound abruptly cut off
    pub keep_silence_ms: u64,
    /// Scan granularity (ms); smaller values increase precision and cost
    pub seek_step_ms: u64,
    /// Chunks shorter than this (ms) are discarded before recognition
    pub min_chunk_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Recognition service endpoint URL
    pub endpoint: String,
    /// Language tag sent with every recognition request, passed through
    /// to the service without validation
    pub language: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation service endpoint URL; empty disables translation
    pub endpoint: String,
    /// Source language code for translation
    pub source_lang: String,
    /// Target language code for the subtitle text
    pub target_lang: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Sample rate for extracted audio
    pub sample_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig {
                min_silence_ms: 800,
                silence_offset_db: 20.0,
                keep_silence_ms: 100,
                seek_step_ms: 10,
                min_chunk_ms: 1000,
            },
            recognizer: RecognizerConfig {
                endpoint: "http://localhost:8080".to_string(),
                language: "ja-JP".to_string(),
                timeout_secs: 30,
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:5000".to_string(),
                source_lang: "ja".to_string(),
                target_lang: "pt".to_string(),
                timeout_secs: 30,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                sample_rate: 16000,
            },
            work_dir: PathBuf::from(".jimaku"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| JimakuError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| JimakuError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| JimakuError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| JimakuError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.segmenter.min_silence_ms, 800);
        assert_eq!(loaded.segmenter.min_chunk_ms, 1000);
        assert_eq!(loaded.recognizer.language, "ja-JP");
        assert_eq!(loaded.translate.target_lang, "pt");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/config.toml").unwrap_err();
        assert!(matches!(err, JimakuError::Config(_)));
    }
}
