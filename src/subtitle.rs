use std::path::Path;

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{JimakuError, Result};

/// One indexed, timestamped caption line as it appears in the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleRecord {
    pub index: usize,
    pub start_s: f64,
    pub end_s: f64,
    pub text: String,
}

/// Streaming SRT writer.
///
/// Records are appended and flushed one at a time, so an interrupted run
/// leaves a valid, truncated subtitle file. Indices are contiguous from 1
/// over written records only; skipped chunks never consume an index.
pub struct SrtWriter {
    file: File,
    next_index: usize,
}

impl SrtWriter {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await?;
        info!("Writing subtitles to {}", path.display());

        Ok(Self {
            file,
            next_index: 1,
        })
    }

    /// Append one record and flush it. Returns the index it was assigned.
    pub async fn write_record(&mut self, start_s: f64, end_s: f64, text: &str) -> Result<usize> {
        let index = self.next_index;
        let block = format!(
            "{}\n{} --> {}\n{}\n\n",
            index,
            format_timestamp(start_s),
            format_timestamp(end_s),
            text.trim()
        );

        self.file.write_all(block.as_bytes()).await?;
        self.file.flush().await?;
        self.next_index += 1;

        Ok(index)
    }

    pub fn records_written(&self) -> usize {
        self.next_index - 1
    }
}

/// Format seconds as an SRT timestamp, `HH:MM:SS,mmm`.
///
/// Arithmetic is done on rounded total milliseconds so values at the
/// millisecond boundary carry over cleanly (59.9995 becomes `00:01:00,000`,
/// never a 60 in the seconds field) and hour-plus durations keep counting.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp back to seconds. Accepts both the comma and dot
/// millisecond separators.
pub fn parse_timestamp(value: &str) -> Result<f64> {
    let invalid = || JimakuError::Subtitle(format!("Invalid timestamp: {}", value));

    let trimmed = value.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
    let (sec_part, ms_part) = parts[2]
        .split_once(|c| c == ',' || c == '.')
        .ok_or_else(invalid)?;
    let secs: u64 = sec_part.parse().map_err(|_| invalid())?;
    let millis: u64 = ms_part.parse().map_err(|_| invalid())?;
    if minutes >= 60 || secs >= 60 || millis >= 1000 {
        return Err(invalid());
    }

    Ok((hours * 3600 + minutes * 60 + secs) as f64 + millis as f64 / 1000.0)
}

/// Read an SRT file back into records.
pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleRecord>> {
    let content = fs::read_to_string(path.as_ref()).await?;

    let mut records = Vec::new();
    for block in content.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let index: usize = lines
            .next()
            .and_then(|line| line.trim().parse().ok())
            .ok_or_else(|| JimakuError::Subtitle("Missing record index".to_string()))?;

        let timing = lines
            .next()
            .ok_or_else(|| JimakuError::Subtitle("Missing timing line".to_string()))?;
        let (start_raw, end_raw) = timing
            .split_once(" --> ")
            .ok_or_else(|| JimakuError::Subtitle(format!("Invalid timing line: {}", timing)))?;

        records.push(SubtitleRecord {
            index,
            start_s: parse_timestamp(start_raw)?,
            end_s: parse_timestamp(end_raw)?,
            text: lines.collect::<Vec<_>>().join("\n"),
        });
    }

    Ok(records)
}

/// Wrap long caption text across lines.
///
/// TODO: break captions longer than ~60 characters on word boundaries so
/// long lines do not overflow the player. Until then the text is passed
/// through unchanged.
pub fn wrap_text(text: &str) -> String {
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(65.5), "00:01:05,500");
        assert_eq!(format_timestamp(3661.999), "01:01:01,999");
    }

    #[test]
    fn test_format_timestamp_rounds_across_the_minute() {
        // Rounding at the millisecond boundary carries into the next
        // second and minute; the seconds field never shows 60.
        assert_eq!(format_timestamp(59.9996), "00:01:00,000");
        assert_eq!(format_timestamp(3599.9996), "01:00:00,000");
        assert_eq!(format_timestamp(59.9994), "00:00:59,999");
    }

    #[test]
    fn test_format_timestamp_multi_hour() {
        assert_eq!(format_timestamp(7322.25), "02:02:02,250");
        assert_eq!(format_timestamp(360000.0), "100:00:00,000");
    }

    #[test]
    fn test_parse_round_trip() {
        for raw in ["00:00:00,000", "00:01:05,500", "01:01:01,999", "11:59:59,001"] {
            let seconds = parse_timestamp(raw).unwrap();
            assert_eq!(format_timestamp(seconds), raw);
        }
    }

    #[test]
    fn test_parse_accepts_dot_separator() {
        assert_eq!(parse_timestamp("00:01:05.500").unwrap(), 65.5);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_timestamp("00:00").is_err());
        assert!(parse_timestamp("00:00:61,000").is_err());
        assert!(parse_timestamp("aa:bb:cc,ddd").is_err());
    }

    #[test]
    fn test_writer_streams_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");

        tokio_test::block_on(async {
            let mut writer = SrtWriter::create(&path).await.unwrap();

            let first = writer.write_record(0.0, 2.0, "hello").await.unwrap();
            assert_eq!(first, 1);

            // The file is already valid after the first flush.
            let partial = read_srt(&path).await.unwrap();
            assert_eq!(partial.len(), 1);
            assert_eq!(partial[0].text, "hello");

            let second = writer.write_record(5.0, 8.0, "  world  ").await.unwrap();
            assert_eq!(second, 2);
            assert_eq!(writer.records_written(), 2);
        });

        let records = tokio_test::block_on(read_srt(&path)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 1);
        assert_eq!(records[1].index, 2);
        assert_eq!(records[1].start_s, 5.0);
        assert_eq!(records[1].end_s, 8.0);
        assert_eq!(records[1].text, "world");
    }

    #[test]
    fn test_wrap_text_is_passthrough() {
        let text = "a caption that is quite long but currently left alone";
        assert_eq!(wrap_text(text), text);
    }
}
