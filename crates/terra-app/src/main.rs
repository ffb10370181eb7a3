//! `terra`: generate a procedural planet from `config.ron` and CLI overrides.
//!
//! Run with `cargo run -p terra-app -- --seed 7 --clouds true` to override the
//! stored settings.

use clap::Parser;
use terra_app::platform::PlatformDirs;
use terra_app::{AppError, FramePacer, generate};
use terra_config::{CliArgs, Config};
use tracing::info;

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("terra: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve_or(args.config.as_deref())?;
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    terra_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        config = %dirs.config_dir.display(),
        logs = %dirs.log_dir.display(),
        "terra starting"
    );

    let mut pacer = FramePacer::new(config.animation.frame_rate);
    let summary = generate(&config, &mut pacer)?;

    info!(
        slices = summary.displacement.pass.slices,
        frames = summary.frames,
        "done"
    );
    Ok(())
}
