use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytclip")]
#[command(author, version, about = "Batch-download YouTube audio as trimmed, tagged MP3 clips")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output directory (overrides the configured download folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run one mode and exit instead of prompting again
    #[arg(long)]
    pub once: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that yt-dlp and ffmpeg are installed
    Doctor,

    /// Show configuration
    Config,
}
