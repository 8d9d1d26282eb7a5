use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use neuroflap_engine::SimulationConfig;

use self::{show_config::ShowConfigArg, train::TrainArg};

mod show_config;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Maximum level of log events written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train birds with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Print the effective configuration as JSON
    ShowConfig(#[clap(flatten)] ShowConfigArg),
}

/// Where the simulation configuration comes from.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// JSON configuration file; missing fields take their default value
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of birds per generation
    #[arg(long)]
    population: Option<usize>,
    /// Probability that a gene is replaced with a fresh random value
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

impl ConfigArg {
    /// Reads the configuration file, applies command-line overrides and validates.
    pub(crate) fn load(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => crate::util::read_config_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(mutation_rate) = self.mutation_rate {
            config.mutation_rate = mutation_rate;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(args.log_level))
        .with_writer(io::stderr)
        .init();

    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::ShowConfig(arg) => show_config::run(&arg)?,
    }
    Ok(())
}
