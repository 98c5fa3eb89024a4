//! Command line front end.

pub mod args;

pub use args::CliArgs;

use anyhow::Context;
use clap::Parser;
use log::info;

use crate::config::ConversionConfig;
use crate::pipeline::Pipeline;

/// Parse arguments, set up logging and run one conversion.
pub fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConversionConfig::default(),
    };
    args.apply_to(&mut config);

    let report = Pipeline::new(config)
        .run(&args.input_file, &args.output_dir)
        .with_context(|| format!("converting {}", args.input_file.display()))?;

    info!(
        "Wrote {} tiles and {} buffers; tileset at {}",
        report.tile_paths.len(),
        report.buffer_paths.len(),
        report.tileset_path.display()
    );
    Ok(())
}

/// `info` by default, `debug` with --verbose; RUST_LOG wins when set
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}
