use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate subtitles for a single video file
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Source language code for recognition and translation
        #[arg(long)]
        from_language: Option<String>,

        /// Target language for the subtitle text
        #[arg(long)]
        to_language: Option<String>,

        /// Output subtitle file (defaults to the video name with .srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate subtitles from an already-extracted WAV file
    Generate {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Source language code for recognition and translation
        #[arg(long)]
        from_language: Option<String>,

        /// Target language for the subtitle text
        #[arg(long)]
        to_language: Option<String>,

        /// Output subtitle file (defaults to the audio name with .srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate subtitles for all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Source language code for recognition and translation
        #[arg(long)]
        from_language: Option<String>,

        /// Target language for the subtitle text
        #[arg(long)]
        to_language: Option<String>,

        /// Output directory for subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract audio from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove exported chunks and extracted audio from the working directory
    Clean,
}
