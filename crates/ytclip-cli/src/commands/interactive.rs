use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use crate::prompt::{Mode, Prompter, MODE_PROMPT};
use ytclip_core::{
    pipeline::{Pipeline, PipelineStage},
    ClipLength, Config, JobSettings, MediaBackend, ToolBackend,
};

pub struct SessionOptions {
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub once: bool,
    /// Spinners are drawn here so log lines can suspend them
    pub bars: MultiProgress,
}

pub async fn run(options: &SessionOptions) -> Result<()> {
    let mut config = Config::load(options.config.as_deref()).context("Failed to load configuration")?;
    if let Some(ref dir) = options.output {
        config.output.directory = dir.clone();
    }

    let download_dir = config.ensure_download_dir().with_context(|| {
        format!(
            "Failed to create download folder {}",
            config.output.directory.display()
        )
    })?;

    let backend = ToolBackend::from_config(&config);

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    prompter.say("YouTube MP3 Batch Tool (yt-dlp)")?;

    let default_clip = config.default_clip_length();
    let clip_length = prompter
        .ask(&format!(
            "Clip length in seconds (default {}): ",
            default_clip.seconds()
        ))?
        .map(|input| ClipLength::from_input(&input, default_clip))
        .unwrap_or(default_clip);

    let settings = JobSettings::new(&config, clip_length);
    info!(
        "Saving {} clips to {}",
        clip_length,
        download_dir.display()
    );

    loop {
        let Some(choice) = prompter.ask(MODE_PROMPT)? else {
            break;
        };

        match Mode::parse(&choice) {
            Some(Mode::Exit) => break,
            Some(mode) => {
                run_mode(mode, &mut prompter, &backend, &settings, &options.bars).await?
            }
            None if options.once => {
                prompter.say("Invalid mode, exiting.")?;
                break;
            }
            None => {
                prompter.say("Invalid mode, choose 1-4.")?;
                continue;
            }
        }

        if options.once {
            break;
        }
    }

    Ok(())
}

async fn run_mode<R: BufRead, W: Write>(
    mode: Mode,
    prompter: &mut Prompter<R, W>,
    backend: &dyn MediaBackend,
    settings: &JobSettings,
    bars: &MultiProgress,
) -> Result<()> {
    let question = match mode {
        Mode::Single => "Enter YouTube video URL: ",
        Mode::Playlist => "Enter YouTube playlist URL: ",
        Mode::Batch => "Enter path to text file with URLs: ",
        Mode::Exit => return Ok(()),
    };
    let answer = prompter.ask(question)?.unwrap_or_default();

    let (tx, rx) = mpsc::unbounded_channel();
    let progress_handle = tokio::spawn(render_progress(rx, bars.clone()));
    let pipeline = Pipeline::new(backend, settings).with_progress(tx);

    let summary = match mode {
        Mode::Single => {
            pipeline.process_item(&answer).await;
            None
        }
        Mode::Playlist => Some(pipeline.process_playlist(&answer).await.summary()),
        // A missing batch file has already been logged
        Mode::Batch => pipeline.process_batch_file(Path::new(&answer)).await.ok(),
        Mode::Exit => None,
    };

    // Dropping the sender ends the progress task
    drop(pipeline);
    progress_handle.await?;

    if let Some(summary) = summary {
        prompter.say(&format!("Summary: {}", summary))?;
    }

    Ok(())
}

async fn render_progress(
    mut rx: mpsc::UnboundedReceiver<PipelineStage>,
    bars: MultiProgress,
) {
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix}{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("=>-");

    let mut prefix = String::new();
    let mut bar: Option<ProgressBar> = None;

    while let Some(stage) = rx.recv().await {
        match stage {
            PipelineStage::PlaylistMember { position, total } => {
                prefix = format!("[{}/{}] ", position, total);
            }
            PipelineStage::Classifying { url } => {
                let pb = bars.add(ProgressBar::new_spinner());
                pb.set_style(style.clone());
                pb.set_prefix(prefix.clone());
                pb.set_message(truncate(&url, 50));
                pb.enable_steady_tick(Duration::from_millis(100));
                bar = Some(pb);
            }
            PipelineStage::ResolvingMetadata => {
                if let Some(pb) = &bar {
                    pb.set_message("Resolving metadata...");
                }
            }
            PipelineStage::AcquiringAudio { title } => {
                if let Some(pb) = &bar {
                    pb.set_message(format!("Downloading: {}", truncate(&title, 40)));
                }
            }
            PipelineStage::TrimmingAndTagging { .. } => {
                if let Some(pb) = &bar {
                    pb.set_message("Trimming and tagging...");
                }
            }
            PipelineStage::Complete { output, duration } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message(format!(
                        "Done: {} ({:.1}s)",
                        output.file_name().unwrap_or_default().to_string_lossy(),
                        duration.as_secs_f32()
                    ));
                }
            }
            PipelineStage::Aborted { stage, error } => {
                if let Some(pb) = bar.take() {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
