use anyhow::Result;
use std::path::Path;
use std::process::Command;
use ytclip_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytclip dependency check\n");

    let mut all_ok = true;

    print!("yt-dlp:          ");
    match config.yt_dlp_path() {
        Ok(path) => match tool_version(&path, "--version") {
            Some(v) => println!("OK ({})", v),
            None => {
                println!("FOUND but failed to get version ({})", path.display());
                all_ok = false;
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("             Install with: pip install yt-dlp");
            all_ok = false;
        }
    }

    print!("ffmpeg:          ");
    match config.ffmpeg_path() {
        Ok(path) => match tool_version(&path, "-version") {
            Some(first_line) => {
                // "ffmpeg version 6.1.1 Copyright ..."
                let version_part = first_line.split_whitespace().nth(2).unwrap_or("unknown");
                println!("OK ({})", version_part);
            }
            None => {
                println!("FOUND but failed to get version ({})", path.display());
                all_ok = false;
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("             Install from https://ffmpeg.org/download.html");
            all_ok = false;
        }
    }

    print!("download folder: ");
    let folder = &config.output.directory;
    if folder.is_dir() {
        println!("OK ({})", folder.display());
    } else if folder.exists() {
        println!("NOT A DIRECTORY ({})", folder.display());
        all_ok = false;
    } else {
        println!("MISSING ({}, created on first run)", folder.display());
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

/// First line of `<tool> <flag>` output, if the tool runs
fn tool_version(path: &Path, flag: &str) -> Option<String> {
    let out = Command::new(path).arg(flag).output().ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
}
