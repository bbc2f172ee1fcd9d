use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::segment::SpeechRange;

/// One exported utterance, addressed by the WAV artifact written for the
/// recognition backend. Timing is tagged in whole seconds of source-audio
/// time for the subtitle track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start_s: u64,
    pub end_s: u64,
    pub wav_path: PathBuf,
}

/// Slice `audio` along `ranges` and persist each kept slice as
/// `chunk{n}.wav` under `run_dir`.
///
/// Slices shorter than `min_chunk_ms` are dropped entirely: they consume no
/// chunk number and are never retried, so numbering always matches
/// processing order.
pub fn export_chunks(
    audio: &AudioBuffer,
    ranges: &[SpeechRange],
    run_dir: &Path,
    min_chunk_ms: u64,
) -> Result<Vec<Chunk>> {
    std::fs::create_dir_all(run_dir)?;

    let mut chunks = Vec::new();
    for range in ranges {
        let slice = audio.slice_ms(range.start_ms, range.end_ms);
        if slice.len_ms() < min_chunk_ms {
            debug!(
                "Dropping range [{} ms, {} ms): below the {} ms minimum",
                range.start_ms, range.end_ms, min_chunk_ms
            );
            continue;
        }

        let index = chunks.len();
        let wav_path = run_dir.join(format!("chunk{}.wav", index));
        debug!("Saving {}", wav_path.display());
        slice.write_wav(&wav_path)?;

        chunks.push(Chunk {
            index,
            start_s: range.start_ms / 1000,
            end_s: range.end_ms / 1000,
            wav_path,
        });
    }

    Ok(chunks)
}
