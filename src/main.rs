//! Jimaku - Silence-Segmented Subtitle Generation
//!
//! This is the main entry point for the jimaku application, which splits a
//! video's audio track on silence, recognizes each utterance through an
//! external speech service, optionally translates it, and writes a timed
//! SRT subtitle file.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jimaku::cli::{Args, Commands};
use jimaku::config::Config;
use jimaku::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Process {
            input,
            from_language,
            to_language,
            output,
        } => {
            info!("Processing video file: {}", input.display());
            apply_languages(&mut config, from_language, to_language);

            let workflow = Workflow::new(config);
            let stats = workflow.process_video(&input, output.as_deref()).await?;
            println!("\n{}", stats.summary());
        }
        Commands::Generate {
            input,
            from_language,
            to_language,
            output,
        } => {
            info!("Generating subtitles from audio: {}", input.display());
            apply_languages(&mut config, from_language, to_language);

            let srt_path = output.unwrap_or_else(|| input.with_extension("srt"));
            let workflow = Workflow::new(config);
            let stats = workflow.generate_from_wav(&input, &srt_path).await?;
            println!("\n{}", stats.summary());
        }
        Commands::Batch {
            input_dir,
            from_language,
            to_language,
            output_dir,
        } => {
            info!("Processing directory: {}", input_dir.display());
            apply_languages(&mut config, from_language, to_language);

            let workflow = Workflow::new(config);
            workflow
                .process_directory(&input_dir, output_dir.as_deref())
                .await?;
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = Workflow::new(config);
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::Clean => {
            let workflow = Workflow::new(config);
            let removed = workflow.clean_workspace().await?;
            println!("Removed {} working entries", removed);
        }
    }

    info!("jimaku completed successfully");
    Ok(())
}

/// Apply CLI language overrides. The source language feeds both the
/// recognizer tag and the translation source; both are passed through to
/// the services opaquely.
fn apply_languages(config: &mut Config, from_language: Option<String>, to_language: Option<String>) {
    if let Some(lang) = from_language {
        config.recognizer.language = lang.clone();
        config.translate.source_lang = lang;
    }
    if let Some(lang) = to_language {
        config.translate.target_lang = lang;
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".jimaku").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "jimaku.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
