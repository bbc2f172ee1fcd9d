use std::path::Path;

use indicatif::ProgressBar;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::audio::AudioBuffer;
use crate::chunk::{self, Chunk};
use crate::config::Config;
use crate::error::{JimakuError, Result};
use crate::media::{MediaProcessor, MediaProcessorFactory};
use crate::recognize::{RecognitionError, Recognizer, RecognizerFactory};
use crate::segment::{detect_speech_ranges, SegmenterParams};
use crate::subtitle::{wrap_text, SrtWriter};
use crate::translate::{Translator, TranslatorFactory};

/// Counters for one subtitle run, threaded through the driver and read-only
/// once the run completes. Only fully resolved chunks are ever reflected
/// here; there are no partial updates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    /// Chunks that survived the minimum-duration filter
    pub total_chunks: usize,
    /// Chunks recognized and written to the subtitle file
    pub valid: usize,
    /// Chunks skipped on recognition failure
    pub invalid: usize,
}

impl RunStatistics {
    /// Share of valid chunks. A run where every range was filtered out has
    /// zero chunks; that reports 0% rather than dividing by zero.
    pub fn valid_percent(&self) -> f64 {
        if self.total_chunks == 0 {
            0.0
        } else {
            self.valid as f64 / self.total_chunks as f64 * 100.0
        }
    }

    pub fn invalid_percent(&self) -> f64 {
        if self.total_chunks == 0 {
            0.0
        } else {
            self.invalid as f64 / self.total_chunks as f64 * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Total Chunks: {}\nValid: {} - {:.2}%\nInvalid: {} - {:.2}%",
            self.total_chunks,
            self.valid,
            self.valid_percent(),
            self.invalid,
            self.invalid_percent()
        )
    }
}

pub struct Workflow {
    config: Config,
    recognizer: Box<dyn Recognizer>,
    translator: Box<dyn Translator>,
    media: Box<dyn MediaProcessor>,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        let recognizer = RecognizerFactory::create(config.recognizer.clone());
        let translator = TranslatorFactory::create(config.translate.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Self::with_services(config, recognizer, translator, media)
    }

    /// Construct with explicit service implementations.
    pub fn with_services(
        config: Config,
        recognizer: Box<dyn Recognizer>,
        translator: Box<dyn Translator>,
        media: Box<dyn MediaProcessor>,
    ) -> Self {
        Self {
            config,
            recognizer,
            translator,
            media,
        }
    }

    /// Generate subtitles for a single video file: extract the audio track,
    /// then run the recognition pipeline over it.
    pub async fn process_video(
        &self,
        video_path: &Path,
        output: Option<&Path>,
    ) -> Result<RunStatistics> {
        if !video_path.exists() {
            return Err(JimakuError::FileNotFound(video_path.display().to_string()));
        }
        self.media.check_availability()?;

        let stem = video_path
            .file_stem()
            .ok_or_else(|| JimakuError::Config("Invalid video filename".to_string()))?
            .to_string_lossy();

        let audio_dir = self.config.work_dir.join("audio");
        fs::create_dir_all(&audio_dir).await?;
        let audio_path = audio_dir.join(format!("{}.wav", stem));

        self.media.extract_audio(video_path, &audio_path).await?;

        let srt_path = match output {
            Some(path) => path.to_path_buf(),
            None => video_path.with_extension("srt"),
        };
        self.generate_from_wav(&audio_path, &srt_path).await
    }

    /// Run the pipeline over an already-extracted WAV file.
    pub async fn generate_from_wav(
        &self,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Result<RunStatistics> {
        if !audio_path.exists() {
            return Err(JimakuError::FileNotFound(audio_path.display().to_string()));
        }

        let audio = AudioBuffer::from_wav_file(audio_path)?;
        self.generate_subtitles(&audio, srt_path).await
    }

    /// The segmentation-and-timing pipeline: detect speech, export chunks,
    /// resolve each chunk through recognition and translation, and stream
    /// accepted lines to the subtitle file.
    pub async fn generate_subtitles(
        &self,
        audio: &AudioBuffer,
        srt_path: &Path,
    ) -> Result<RunStatistics> {
        let segmenter = &self.config.segmenter;
        let params = SegmenterParams {
            min_silence_ms: segmenter.min_silence_ms,
            // Threshold adapts to the clip's overall loudness.
            silence_thresh_db: audio.dbfs() - segmenter.silence_offset_db,
            seek_step_ms: segmenter.seek_step_ms,
            keep_silence_ms: segmenter.keep_silence_ms,
        };

        info!(
            "Segmenting {:.1}s of audio (threshold {:.1} dBFS)",
            audio.duration_secs(),
            params.silence_thresh_db
        );
        let ranges = detect_speech_ranges(audio, &params);
        info!("Detected {} speech ranges", ranges.len());

        let run_dir = self
            .config
            .work_dir
            .join("chunks")
            .join(Uuid::new_v4().to_string());
        let chunks = chunk::export_chunks(audio, &ranges, &run_dir, segmenter.min_chunk_ms)?;
        info!(
            "Exported {} chunks to {} ({} ranges dropped below minimum duration)",
            chunks.len(),
            run_dir.display(),
            ranges.len() - chunks.len()
        );

        let mut stats = RunStatistics {
            total_chunks: chunks.len(),
            ..Default::default()
        };

        let mut writer = SrtWriter::create(srt_path).await?;
        let progress = ProgressBar::new(chunks.len() as u64);

        for chunk in &chunks {
            match self.resolve_chunk(chunk).await {
                Some(text) => {
                    let text = wrap_text(&text);
                    let index = writer
                        .write_record(chunk.start_s as f64, chunk.end_s as f64, &text)
                        .await?;
                    stats.valid += 1;
                    info!("Line {}: {}", index, text);
                }
                None => {
                    stats.invalid += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Run complete: {} chunks, {} valid ({:.2}%), {} invalid ({:.2}%)",
            stats.total_chunks,
            stats.valid,
            stats.valid_percent(),
            stats.invalid,
            stats.invalid_percent()
        );

        Ok(stats)
    }

    /// Per-chunk state machine: recognition first, then translation with
    /// fallback. Returns the resolved caption text, or None when the chunk
    /// is skipped. Translation can never turn a recognized chunk into a
    /// failure.
    async fn resolve_chunk(&self, chunk: &Chunk) -> Option<String> {
        debug!("Processing chunk {}", chunk.index);

        let recognized = match self
            .recognizer
            .recognize(&chunk.wav_path, &self.config.recognizer.language)
            .await
        {
            Ok(text) => text,
            Err(RecognitionError::Unintelligible) => {
                info!("Chunk {}: could not understand audio", chunk.index);
                return None;
            }
            Err(RecognitionError::ServiceUnavailable(reason)) => {
                warn!("Chunk {}: {}", chunk.index, reason);
                return None;
            }
        };

        let translate = &self.config.translate;
        match self
            .translator
            .translate(&recognized, &translate.source_lang, &translate.target_lang)
            .await
        {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!(
                    "Chunk {}: {}; keeping untranslated text",
                    chunk.index, e
                );
                Some(recognized)
            }
        }
    }

    /// Extract audio from a video file without generating subtitles.
    pub async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        if !video_path.exists() {
            return Err(JimakuError::FileNotFound(video_path.display().to_string()));
        }
        self.media.check_availability()?;
        self.media.extract_audio(video_path, audio_path).await
    }

    /// Generate subtitles for every video file under a directory.
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
    ) -> Result<()> {
        if !input_dir.is_dir() {
            return Err(JimakuError::Config(
                "Input path is not a directory".to_string(),
            ));
        }
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).await?;
        }

        let video_extensions = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];
        let mut video_files = Vec::new();

        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if let Some(extension) = entry.path().extension() {
                if let Some(ext_str) = extension.to_str() {
                    if video_extensions.contains(&ext_str.to_lowercase().as_str()) {
                        video_files.push(entry.path().to_path_buf());
                    }
                }
            }
        }

        info!("Found {} video files to process", video_files.len());

        for video_path in video_files {
            let output = output_dir.and_then(|dir| {
                video_path
                    .file_stem()
                    .map(|stem| dir.join(format!("{}.srt", stem.to_string_lossy())))
            });

            match self.process_video(&video_path, output.as_deref()).await {
                Ok(stats) => info!(
                    "Successfully processed {} ({} lines written)",
                    video_path.display(),
                    stats.valid
                ),
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
        }

        Ok(())
    }

    /// Remove exported chunks and extracted audio from the working
    /// directory. Returns the number of entries removed.
    pub async fn clean_workspace(&self) -> Result<u64> {
        let mut removed = 0;

        for sub in ["chunks", "audio"] {
            let dir = self.config.work_dir.join(sub);
            if !dir.exists() {
                continue;
            }

            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path).await?;
                } else {
                    fs::remove_file(&path).await?;
                }
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaProcessor;
    use crate::recognize::MockRecognizer;
    use crate::subtitle::read_srt;
    use crate::translate::{MockTranslator, TranslationError};

    fn test_config(work_dir: &Path) -> Config {
        let mut config = Config::default();
        config.work_dir = work_dir.to_path_buf();
        config
    }

    /// Build a 1 kHz buffer (one sample per ms) from (amplitude, ms) spans.
    fn waveform(spans: &[(i16, u64)]) -> AudioBuffer {
        let mut samples = Vec::new();
        for &(amplitude, ms) in spans {
            samples.extend(std::iter::repeat(amplitude).take(ms as usize));
        }
        AudioBuffer::new(samples, 1000)
    }

    /// Three utterances separated by full-second silences.
    fn three_utterances() -> AudioBuffer {
        waveform(&[
            (16000, 2000),
            (0, 1000),
            (16000, 2000),
            (0, 1000),
            (16000, 2000),
            (0, 1000),
        ])
    }

    #[test]
    fn test_percentages_defined_for_empty_run() {
        let stats = RunStatistics::default();
        assert_eq!(stats.valid_percent(), 0.0);
        assert_eq!(stats.invalid_percent(), 0.0);
        assert!(stats.summary().contains("Total Chunks: 0"));
    }

    #[test]
    fn test_percentages_for_mixed_run() {
        let stats = RunStatistics {
            total_chunks: 4,
            valid: 3,
            invalid: 1,
        };
        assert_eq!(stats.valid_percent(), 75.0);
        assert_eq!(stats.invalid_percent(), 25.0);
    }

    #[tokio::test]
    async fn test_failed_chunk_skips_index_without_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("out.srt");

        let mut recognizer = MockRecognizer::new();
        recognizer.expect_recognize().returning(|path, _language| {
            if path.ends_with("chunk1.wav") {
                Err(RecognitionError::Unintelligible)
            } else {
                Ok("hello".to_string())
            }
        });

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _, _| Ok("ola".to_string()));

        let workflow = Workflow::with_services(
            test_config(dir.path()),
            Box::new(recognizer),
            Box::new(translator),
            Box::new(MockMediaProcessor::new()),
        );

        let stats = workflow
            .generate_subtitles(&three_utterances(), &srt_path)
            .await
            .unwrap();

        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.invalid, 1);

        let records = read_srt(&srt_path).await.unwrap();
        assert_eq!(records.len(), 2);
        // Indices stay contiguous; the failed chunk consumed none.
        assert_eq!(records[0].index, 1);
        assert_eq!(records[1].index, 2);
        assert_eq!(records[0].start_s, 0.0);
        assert_eq!(records[0].end_s, 2.0);
        assert_eq!(records[1].start_s, 5.0);
        assert_eq!(records[1].end_s, 8.0);
        assert_eq!(records[0].text, "ola");
    }

    #[tokio::test]
    async fn test_service_failure_counts_invalid_without_abort() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("out.srt");

        let mut recognizer = MockRecognizer::new();
        recognizer.expect_recognize().returning(|path, _language| {
            if path.ends_with("chunk0.wav") {
                Err(RecognitionError::ServiceUnavailable(
                    "connection refused".to_string(),
                ))
            } else {
                Ok("hello".to_string())
            }
        });

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|text, _, _| Ok(text.to_string()));

        let workflow = Workflow::with_services(
            test_config(dir.path()),
            Box::new(recognizer),
            Box::new(translator),
            Box::new(MockMediaProcessor::new()),
        );

        let stats = workflow
            .generate_subtitles(&three_utterances(), &srt_path)
            .await
            .unwrap();

        assert_eq!(stats.valid, 2);
        assert_eq!(stats.invalid, 1);

        let records = read_srt(&srt_path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start_s, 2.0);
    }

    #[tokio::test]
    async fn test_translation_failure_falls_back_to_recognized_text() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("out.srt");

        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .returning(|_, _| Ok("признал".to_string()));

        let mut translator = MockTranslator::new();
        translator.expect_translate().returning(|_, _, _| {
            Err(TranslationError::Unavailable("model offline".to_string()))
        });

        let workflow = Workflow::with_services(
            test_config(dir.path()),
            Box::new(recognizer),
            Box::new(translator),
            Box::new(MockMediaProcessor::new()),
        );

        let audio = waveform(&[(16000, 2000)]);
        let stats = workflow.generate_subtitles(&audio, &srt_path).await.unwrap();

        // The chunk still counts as valid.
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.invalid, 0);

        let records = read_srt(&srt_path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "признал");
    }

    #[tokio::test]
    async fn test_all_chunks_filtered_yields_empty_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("out.srt");

        // A single 800 ms utterance: detected, then dropped below the
        // 1000 ms chunk minimum.
        let audio = waveform(&[(16000, 800)]);

        let workflow = Workflow::with_services(
            test_config(dir.path()),
            Box::new(MockRecognizer::new()),
            Box::new(MockTranslator::new()),
            Box::new(MockMediaProcessor::new()),
        );

        let stats = workflow.generate_subtitles(&audio, &srt_path).await.unwrap();

        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.valid_percent(), 0.0);
        assert_eq!(stats.invalid_percent(), 0.0);

        let records = read_srt(&srt_path).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_clean_workspace_removes_run_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("out.srt");

        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .returning(|_, _| Ok("hello".to_string()));
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|text, _, _| Ok(text.to_string()));

        let workflow = Workflow::with_services(
            test_config(dir.path()),
            Box::new(recognizer),
            Box::new(translator),
            Box::new(MockMediaProcessor::new()),
        );

        let audio = waveform(&[(16000, 2000)]);
        workflow.generate_subtitles(&audio, &srt_path).await.unwrap();

        let removed = workflow.clean_workspace().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(workflow.clean_workspace().await.unwrap(), 0);
    }
}
