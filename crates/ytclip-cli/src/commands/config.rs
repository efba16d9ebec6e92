use anyhow::{Context, Result};
use std::path::Path;
use ytclip_core::config::{user_config_file, Config};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    println!("ytclip configuration\n");

    // Unset paths are omitted from the TOML output
    print!("{}", toml::to_string_pretty(&config)?);
    if config.paths.yt_dlp.is_none() || config.paths.ffmpeg.is_none() {
        println!("# unset tool paths are auto-detected from PATH");
    }
    if config.temp.directory.is_none() {
        println!("# downloads are staged inside the output directory");
    }

    println!("\nConfig sources (later entries win):");
    println!("  1. Built-in defaults");
    if let Some(p) = user_config_file() {
        println!("  2. {}", p.display());
    }
    if let Some(p) = config_path {
        println!("  3. {} (specified)", p.display());
    }
    println!("  4. Environment variables (YTCLIP_*, e.g. YTCLIP_OUTPUT__DIRECTORY)");

    Ok(())
}
