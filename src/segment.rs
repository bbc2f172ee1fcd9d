use tracing::debug;

use crate::audio::AudioBuffer;

/// Half-open non-silent interval `[start_ms, end_ms)` in source-audio time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl SpeechRange {
    pub fn len_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SegmenterParams {
    /// Minimum contiguous silence (ms) that ends an utterance
    pub min_silence_ms: u64,
    /// Windows quieter than this (dBFS) are silent. Callers derive it from
    /// the clip's average loudness minus an offset.
    pub silence_thresh_db: f64,
    /// Scan window size (ms)
    pub seek_step_ms: u64,
    /// Silence (ms) kept on both ends of each range
    pub keep_silence_ms: u64,
}

/// Scan the buffer in `seek_step_ms` windows and coalesce non-silent
/// windows into speech ranges. A silent gap only ends an utterance once it
/// has persisted for `min_silence_ms`; shorter gaps stay inside the range,
/// as does trailing silence that never reaches the minimum. Each range is
/// then expanded by `keep_silence_ms` on both ends and clamped to
/// `[0, len_ms]`.
///
/// Pure function of the inputs: same buffer and params always yield the
/// same ranges, sorted and non-overlapping.
pub fn detect_speech_ranges(audio: &AudioBuffer, params: &SegmenterParams) -> Vec<SpeechRange> {
    let len_ms = audio.len_ms();
    if len_ms == 0 {
        return Vec::new();
    }
    let step = params.seek_step_ms.max(1);

    let mut ranges: Vec<SpeechRange> = Vec::new();
    let mut speech_start: Option<u64> = None;
    let mut gap_start: Option<u64> = None;

    let mut pos = 0;
    while pos < len_ms {
        let window_end = (pos + step).min(len_ms);
        let silent = audio.dbfs_range(pos, window_end) < params.silence_thresh_db;

        if silent {
            if let Some(start) = speech_start {
                let gap = *gap_start.get_or_insert(pos);
                if window_end - gap >= params.min_silence_ms {
                    // The utterance ends where the qualifying gap began.
                    push_padded(&mut ranges, start, gap, params, len_ms);
                    speech_start = None;
                    gap_start = None;
                }
            }
        } else {
            if speech_start.is_none() {
                speech_start = Some(pos);
            }
            gap_start = None;
        }

        pos = window_end;
    }

    if let Some(start) = speech_start {
        push_padded(&mut ranges, start, len_ms, params, len_ms);
    }

    debug!(
        "Detected {} speech ranges at threshold {:.1} dBFS",
        ranges.len(),
        params.silence_thresh_db
    );

    ranges
}

fn push_padded(
    ranges: &mut Vec<SpeechRange>,
    start_ms: u64,
    end_ms: u64,
    params: &SegmenterParams,
    len_ms: u64,
) {
    let mut start = start_ms.saturating_sub(params.keep_silence_ms);
    // Padding must not reach back into the previous range.
    if let Some(last) = ranges.last() {
        start = start.max(last.end_ms);
    }
    let end = (end_ms + params.keep_silence_ms).min(len_ms);
    if end > start {
        ranges.push(SpeechRange {
            start_ms: start,
            end_ms: end,
        });
    }
}
