mod args;
mod commands;
mod progress;
mod prompt;

use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "ytclip=info",
        1 => "ytclip=debug",
        2 => "ytclip=trace",
        _ => "trace",
    };

    // Logs go to stderr so prompts on stdout stay readable; spinners share it
    let bars = MultiProgress::new();
    let writer = progress::SuspendWriter::new(bars.clone(), std::io::stderr);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(writer))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            let options = commands::interactive::SessionOptions {
                config: cli.config,
                output: cli.output,
                once: cli.once,
                bars,
            };
            commands::interactive::run(&options).await
        }
    }
}
