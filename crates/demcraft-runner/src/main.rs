use clap::Parser;
use demcraft_runner::{run, GenerationConfig, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "demcraft")]
#[command(about = "Convert SRTM elevation tiles into Minecraft Bedrock terrain functions")]
struct Args {
    /// YAML configuration file (defaults apply to anything it leaves out)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the .hgt tiles
    #[arg(short, long)]
    tiles: Option<PathBuf>,

    /// Function directory of the behavior pack
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replay the written chunks and check them against the height field
    #[arg(long)]
    verify: bool,

    /// Log filter, e.g. "debug" or "demcraft_emit=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<GenerationConfig, RunnerError> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(tiles) = &args.tiles {
        config.tile_dir = tiles.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    config.verify |= args.verify;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result =
        load_config(&args).and_then(|config| run(&config).map(|summary| (config, summary)));
    match result {
        Ok((config, summary)) => {
            info!(
                "Done: {}x{} cells, levels {}..={}, {} files in {}",
                summary.width,
                summary.length,
                summary.min_level,
                summary.max_level,
                summary.files_written,
                config.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
