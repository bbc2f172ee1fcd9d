use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{JimakuError, Result};

/// RMS floor used when converting to dBFS, so digital silence maps to a
/// finite loudness (-180 dBFS) instead of negative infinity.
const MIN_RMS: f64 = 1e-9;

/// Immutable mono PCM audio with a known sample rate.
///
/// Created once per run from the extracted audio track and never mutated;
/// the pipeline only reads loudness from it and slices it into sub-buffers.
/// Slicing copies the sample range eagerly, which is acceptable for the
/// clip-sized workloads this tool handles.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Load a 16-bit PCM WAV file, downmixing multi-channel audio to mono.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| JimakuError::Audio(format!("Failed to open {}: {}", path.display(), e)))?;

        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(JimakuError::Audio(format!(
                "Unsupported WAV format in {}: expected 16-bit PCM, got {}-bit {:?}",
                path.display(),
                spec.bits_per_sample,
                spec.sample_format
            )));
        }

        let raw: Vec<i16> = reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| JimakuError::Audio(format!("Failed to read samples: {}", e)))?;

        let channels = spec.channels as usize;
        let samples = if channels <= 1 {
            raw
        } else {
            raw.chunks_exact(channels)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    (sum / channels as i32) as i16
                })
                .collect()
        };

        debug!(
            "Loaded {} ({} samples, {} Hz, {} channels downmixed)",
            path.display(),
            samples.len(),
            spec.sample_rate,
            channels
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds.
    pub fn len_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Average loudness of the whole buffer in dBFS.
    pub fn dbfs(&self) -> f64 {
        self.dbfs_range(0, self.len_ms())
    }

    /// Average loudness of `[start_ms, end_ms)` in dBFS. An empty range
    /// reads as the silence floor.
    pub fn dbfs_range(&self, start_ms: u64, end_ms: u64) -> f64 {
        let (start, end) = self.sample_range(start_ms, end_ms);
        let window = &self.samples[start..end];
        if window.is_empty() {
            return 20.0 * MIN_RMS.log10();
        }

        let sum_sq: f64 = window
            .iter()
            .map(|&s| {
                let x = s as f64 / 32768.0;
                x * x
            })
            .sum();
        let rms = (sum_sq / window.len() as f64).sqrt();

        20.0 * rms.max(MIN_RMS).log10()
    }

    /// Copy out `[start_ms, end_ms)`, clamped to the buffer bounds.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioBuffer {
        let (start, end) = self.sample_range(start_ms, end_ms);
        AudioBuffer {
            samples: self.samples[start..end].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// Persist as 16-bit mono WAV, the format the recognition backend reads.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)
            .map_err(|e| JimakuError::Audio(format!("Failed to create {}: {}", path.display(), e)))?;

        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| JimakuError::Audio(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| JimakuError::Audio(format!("Failed to finalize {}: {}", path.display(), e)))?;

        Ok(())
    }

    fn sample_range(&self, start_ms: u64, end_ms: u64) -> (usize, usize) {
        let to_index = |ms: u64| (ms * self.sample_rate as u64 / 1000) as usize;
        let start = to_index(start_ms).min(self.samples.len());
        let end = to_index(end_ms).min(self.samples.len()).max(start);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 kHz sample rate makes one sample per millisecond.
    fn buffer_with(amplitude: i16, ms: u64) -> AudioBuffer {
        AudioBuffer::new(vec![amplitude; ms as usize], 1000)
    }

    #[test]
    fn test_len_ms() {
        let audio = AudioBuffer::new(vec![0; 16000], 16000);
        assert_eq!(audio.len_ms(), 1000);
        assert_eq!(audio.duration_secs(), 1.0);
    }

    #[test]
    fn test_dbfs_half_scale() {
        let audio = buffer_with(16384, 100);
        let dbfs = audio.dbfs();
        // 16384/32768 = 0.5 -> 20*log10(0.5) ~ -6.02 dBFS
        assert!((dbfs + 6.02).abs() < 0.01, "got {}", dbfs);
    }

    #[test]
    fn test_dbfs_silence_is_finite() {
        let audio = buffer_with(0, 100);
        let dbfs = audio.dbfs();
        assert!(dbfs.is_finite());
        assert!(dbfs <= -170.0);
    }

    #[test]
    fn test_slice_clamps_to_bounds() {
        let audio = buffer_with(1000, 500);
        let slice = audio.slice_ms(400, 900);
        assert_eq!(slice.len_ms(), 100);

        let empty = audio.slice_ms(600, 700);
        assert!(empty.is_empty());

        let inverted = audio.slice_ms(300, 200);
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let audio = AudioBuffer::new(vec![0, 1000, -1000, 32767, -32768], 16000);
        audio.write_wav(&path).unwrap();

        let loaded = AudioBuffer::from_wav_file(&path).unwrap();
        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.samples(), audio.samples());
    }
}
