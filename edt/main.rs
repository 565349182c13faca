use std::path::Path;

use anyhow::{
  Context,
  Result,
};

use crate::{
  cli::CliOptions,
  config::Config,
};

mod cli;
mod commands;
mod config;
mod files;

fn main() -> Result<()> {
  let options = CliOptions::parse()?;

  edt_loader::initialize_config_file(options.config_file.clone());
  edt_loader::initialize_log_file(options.log_file.clone());
  setup_logging(options.verbosity, &edt_loader::log_file()).context("failed to initialize logging")?;

  let config = Config::load_user().context("failed to load config")?;
  log::debug!("running {:?}", options.command);

  let summary = commands::run(&options.command, &config)?;
  println!("{summary}");
  Ok(())
}

fn setup_logging(verbosity: u8, log_file: &Path) -> Result<()> {
  let level = match verbosity {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(level)
    .chain(fern::log_file(log_file)?)
    .apply()?;
  Ok(())
}
