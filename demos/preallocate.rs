//! A simple CLI app that preallocates a file and reports how it went.

use std::path::PathBuf;

use clap::Parser;

/// Preallocate the disk space for a file.
#[derive(Debug, Parser)]
struct Cli {
    /// The amount of bytes to reserve.
    #[arg(allow_negative_numbers = true)]
    size: i64,

    /// The file to create or open.
    #[arg(required_unless_present = "temp_dir")]
    path: Option<PathBuf>,

    /// Create a new temporary file in this directory instead.
    #[arg(long, conflicts_with = "path")]
    temp_dir: Option<PathBuf>,

    /// The name pattern for the temporary file.
    #[arg(long, default_value = "preallocate-*")]
    pattern: String,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cli = Cli::parse();
    tracing::info!(message = "preallocating", size = %cli.size, backend = ?preallocate::backend());

    let (file, path) = match (cli.temp_dir, cli.path) {
        (Some(dir), _) => preallocate::preallocate_temp_file(dir, &cli.pattern, cli.size)?,
        (None, Some(path)) => (preallocate::preallocate_at_path(&path, cli.size)?, path),
        (None, None) => anyhow::bail!("pass a file path or --temp-dir"),
    };

    let len = file.metadata()?.len();
    tracing::info!(message = "done", path = %path.display(), %len);

    Ok(())
}
